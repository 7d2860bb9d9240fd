use std::collections::{btree_map, BTreeMap};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::InvalidDeviceError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A device that occupies a numbered slot within its device class.
pub trait Slotted {
    /// The slot this device occupies.
    fn slot(&self) -> u8;

    /// Renders the specifier tag of this device's class for `slot`, e.g. `vdb` or `cdrom1`.
    fn tag_for(&self, slot: u8) -> String;
}

/// Why a slot cannot be taken next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRejection {
    /// The slot is already populated.
    Duplicate,

    /// The slot's predecessor is not populated yet.
    Gap,
}

/// The slot address space of one device class.
///
/// Slots are handed out strictly in declaration order: the table only ever holds slots
/// `0..len`, so the next admissible slot is always `len`. Declaring `vdb` before `vda` is
/// rejected even though both would eventually form a contiguous set.
///
/// ## Examples
///
/// ```
/// use corectl::vm::{SlotRejection, SlotTable, NetworkInterface};
///
/// let mut table = SlotTable::default();
/// assert_eq!(table.admits(1), Err(SlotRejection::Gap));
///
/// table.insert(NetworkInterface::raw(0)).unwrap();
/// assert_eq!(table.admits(0), Err(SlotRejection::Duplicate));
/// assert_eq!(table.admits(1), Ok(()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable<T> {
    entries: BTreeMap<u8, T>,

    /// The number of slots declared contiguously from zero so far.
    next_slot: u8,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<T> SlotTable<T> {
    /// Checks whether `slot` is the next slot this table can take.
    pub fn admits(&self, slot: u8) -> Result<(), SlotRejection> {
        match slot.cmp(&self.next_slot) {
            std::cmp::Ordering::Less => Err(SlotRejection::Duplicate),
            std::cmp::Ordering::Greater => Err(SlotRejection::Gap),
            std::cmp::Ordering::Equal => Ok(()),
        }
    }

    /// Iterates over the devices in slot order.
    pub fn iter(&self) -> btree_map::Values<'_, u8, T> {
        self.entries.values()
    }

    /// Returns the number of populated slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Slotted> SlotTable<T> {
    /// Puts `device` into its slot if that slot is the next one in line.
    pub fn insert(&mut self, device: T) -> Result<(), InvalidDeviceError> {
        let slot = device.slot();
        match self.admits(slot) {
            Ok(()) => {
                self.entries.insert(slot, device);
                self.next_slot += 1;
                Ok(())
            }
            Err(SlotRejection::Duplicate) => {
                Err(InvalidDeviceError::DuplicateSlot(device.tag_for(slot)))
            }
            Err(SlotRejection::Gap) => Err(InvalidDeviceError::SlotGap(
                device.tag_for(slot),
                device.tag_for(slot - 1),
            )),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_slot: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a SlotTable<T> {
    type Item = &'a T;
    type IntoIter = btree_map::Values<'a, u8, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Slotted> TryFrom<BTreeMap<u8, T>> for SlotTable<T> {
    type Error = InvalidDeviceError;

    fn try_from(entries: BTreeMap<u8, T>) -> Result<Self, Self::Error> {
        let mut table = Self::default();
        for device in entries.into_values() {
            table.insert(device)?;
        }

        Ok(table)
    }
}

impl<T: Serialize> Serialize for SlotTable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.entries.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for SlotTable<T>
where
    T: Deserialize<'de> + Slotted,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = BTreeMap::<u8, T>::deserialize(deserializer)?;
        if let Some((key, device)) = entries.iter().find(|(key, device)| **key != device.slot()) {
            return Err(serde::de::Error::custom(format!(
                "slot key {} holds {}",
                key,
                device.tag_for(device.slot())
            )));
        }

        Self::try_from(entries).map_err(serde::de::Error::custom)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
