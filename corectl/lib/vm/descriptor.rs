use std::path::PathBuf;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::{
    config::{
        Channel, DEFAULT_CHANNEL, DEFAULT_NUM_VCPUS, DEFAULT_RAM_MIB, DEFAULT_XHYVE_PATH,
        LATEST_VERSION, RANDOM_UUID,
    },
    management, CorectlError, CorectlResult, HostContext, InvalidDeviceError,
};

use super::{
    CloudConfig, NetworkInterface, NetworkKind, SlotTable, Slotted, StorageDevice, StorageKind,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The raw, unvalidated description of the VM a user asked for.
///
/// Every field holds exactly what was typed on the command line. [`VmDescriptor::assemble`] turns
/// it into a validated descriptor.
///
/// ## Examples
///
/// ```
/// use corectl::vm::RunRequest;
///
/// let request = RunRequest::builder()
///     .memory("2048")
///     .volumes(vec!["vda@disk.img".to_string()])
///     .networks(vec!["eth0".to_string(), "eth1".to_string()])
///     .build();
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunRequest {
    /// The CoreOS release channel.
    #[builder(default = DEFAULT_CHANNEL.to_string(), setter(into))]
    channel: String,

    /// The CoreOS version, or `latest`.
    #[builder(default = LATEST_VERSION.to_string(), setter(into))]
    version: String,

    /// The xhyve binary, as a path or a name to look up in `PATH`.
    #[builder(default = DEFAULT_XHYVE_PATH.to_string(), setter(into))]
    xhyve: String,

    /// Extra arguments handed to xhyve verbatim.
    #[builder(default, setter(into))]
    extra: String,

    /// The VM's UUID, or `random`.
    #[builder(default = RANDOM_UUID.to_string(), setter(into))]
    uuid: String,

    /// The number of vCPUs.
    #[builder(default = DEFAULT_NUM_VCPUS.to_string(), setter(into))]
    cpus: String,

    /// The amount of RAM in MiB.
    #[builder(default = DEFAULT_RAM_MIB.to_string(), setter(into))]
    memory: String,

    /// The SSH public key to authorize in the guest.
    #[builder(default, setter(into))]
    ssh_key: String,

    /// Volume specifiers, `vd[a-z]@PATH` or `cdrom[0-9]@PATH`.
    #[builder(default)]
    volumes: Vec<String>,

    /// Network specifiers, `eth[0-9]` or `tap[0-9]`.
    #[builder(default)]
    networks: Vec<String>,

    /// A cloud-config URL or local path.
    #[builder(default, setter(into))]
    cloud_config: String,
}

/// The guest's network interfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(try_from = "NetworkEntries")]
#[getset(get = "pub with_prefix")]
pub struct Network {
    /// Raw virtio-net interfaces by slot.
    #[serde(default)]
    raw: SlotTable<NetworkInterface>,
}

/// The guest's drives. Hard drives and CD-ROM drives number their slots independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(try_from = "StorageEntries")]
#[getset(get = "pub with_prefix")]
pub struct Storage {
    /// Hard drives by slot.
    #[serde(default)]
    hard_drives: SlotTable<StorageDevice>,

    /// CD-ROM drives by slot.
    #[serde(default)]
    cd_drives: SlotTable<StorageDevice>,
}

#[derive(Deserialize)]
struct NetworkEntries {
    #[serde(default)]
    raw: SlotTable<NetworkInterface>,
}

#[derive(Deserialize)]
struct StorageEntries {
    #[serde(default)]
    hard_drives: SlotTable<StorageDevice>,

    #[serde(default)]
    cd_drives: SlotTable<StorageDevice>,
}

/// Everything needed to boot one CoreOS guest.
///
/// A descriptor starts out empty and is filled in by the validation steps of
/// [`VmDescriptor::assemble`], in a fixed order. Once the VM boots it is written, as JSON, to the
/// run directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct VmDescriptor {
    /// The VM's UUID.
    #[getset(get_copy = "pub with_prefix")]
    uuid: Uuid,

    /// The CoreOS release channel.
    #[getset(get_copy = "pub with_prefix")]
    channel: Channel,

    /// The CoreOS version.
    #[getset(get = "pub with_prefix")]
    version: String,

    /// The number of vCPUs.
    #[getset(get_copy = "pub with_prefix")]
    cpus: u32,

    /// The amount of RAM in MiB.
    #[getset(get_copy = "pub with_prefix")]
    memory: u32,

    /// The resolved xhyve binary.
    #[getset(get = "pub with_prefix")]
    xhyve: PathBuf,

    /// Extra xhyve arguments, passed through unchecked.
    #[getset(get = "pub with_prefix")]
    extra: String,

    /// The SSH public key authorized in the guest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[getset(get = "pub with_prefix")]
    ssh_key: Option<String>,

    /// The guest's cloud-config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[getset(get = "pub with_prefix")]
    cloud_config: Option<CloudConfig>,

    /// The guest's network interfaces.
    #[getset(get = "pub with_prefix")]
    network: Network,

    /// The guest's drives.
    #[getset(get = "pub with_prefix")]
    storage: Storage,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl VmDescriptor {
    /// Validates `request` step by step and returns the finished descriptor.
    ///
    /// The steps run in this order: channel, version, image lookup, xhyve lookup, extra
    /// arguments, UUID, CPUs, RAM, SSH key, volumes, network interfaces, cloud-config. A guest
    /// that asked for no network interface gets `eth0`.
    ///
    /// Bad CPU, RAM, UUID and channel values fall back to defaults with a warning. Everything
    /// else that fails aborts the whole run.
    pub async fn assemble(request: &RunRequest, ctx: &HostContext) -> CorectlResult<Self> {
        let mut vm = Self::default();

        vm.set_channel(&request.channel);
        vm.set_version(&request.version);
        vm.lookup_image(ctx).await?;
        vm.check_xhyve(&request.xhyve)?;
        vm.set_extra(&request.extra);
        vm.check_uuid(&request.uuid);
        vm.validate_cpus(&request.cpus);
        vm.validate_ram(&request.memory);
        vm.set_ssh_key(&request.ssh_key);
        vm.add_volumes(&request.volumes, ctx)?;
        vm.add_network_interfaces(&request.networks)?;
        vm.resolve_cloud_config(&request.cloud_config, ctx).await?;
        vm.ensure_default_nic();

        Ok(vm)
    }

    /// Sets the release channel, falling back to `alpha` for unknown names.
    pub fn set_channel(&mut self, channel: &str) {
        self.channel = channel.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "{} is not a known CoreOS channel. using '{}', the default",
                channel,
                Channel::default()
            );
            Channel::default()
        });
    }

    /// Sets the CoreOS version. An empty version means `latest`.
    pub fn set_version(&mut self, version: &str) {
        self.version = if version.is_empty() {
            LATEST_VERSION.to_string()
        } else {
            version.to_string()
        };
    }

    /// Checks that the image for the current channel and version is cached, and pins `latest`
    /// to the concrete version found.
    pub async fn lookup_image(&mut self, ctx: &HostContext) -> CorectlResult<()> {
        let image = management::lookup_image(ctx.get_home(), self.channel, &self.version).await?;
        self.version = image.get_version().clone();
        Ok(())
    }

    /// Locates the xhyve binary, either at the given path or in `PATH`.
    pub fn check_xhyve(&mut self, xhyve: &str) -> CorectlResult<()> {
        self.xhyve =
            which::which(xhyve).map_err(|e| CorectlError::HypervisorNotFound(xhyve.into(), e))?;
        Ok(())
    }

    /// Sets extra xhyve arguments.
    ///
    /// They are not checked against the slots corectl assigns itself, so `-s` flags in here can
    /// collide with generated devices.
    pub fn set_extra(&mut self, extra: &str) {
        self.extra = extra.to_string();
    }

    /// Sets the UUID.
    ///
    /// `random` silently yields a fresh v4 UUID. Anything that is not a valid UUID yields one too,
    /// with a warning.
    pub fn check_uuid(&mut self, uuid: &str) {
        self.uuid = if uuid == RANDOM_UUID {
            Uuid::new_v4()
        } else {
            Uuid::parse_str(uuid).unwrap_or_else(|_| {
                tracing::warn!(
                    "{} not a valid UUID as it doesn't follow RFC 4122. using a randomly generated one",
                    uuid
                );
                Uuid::new_v4()
            })
        };
    }

    /// Sets the vCPU count, falling back to 1 for anything that is not a positive integer.
    pub fn validate_cpus(&mut self, cpus: &str) {
        self.cpus = match cpus.parse::<u32>() {
            Ok(cpus) if cpus > 0 => cpus,
            _ => {
                tracing::warn!(
                    "{} not a reasonable CPU #. using '{}', the default",
                    cpus,
                    DEFAULT_NUM_VCPUS
                );
                DEFAULT_NUM_VCPUS
            }
        };
    }

    /// Sets the RAM in MiB, falling back to 1024 for non-integers and anything below 1024.
    pub fn validate_ram(&mut self, memory: &str) {
        self.memory = match memory.parse::<u32>() {
            Ok(memory) if memory >= DEFAULT_RAM_MIB => memory,
            _ => {
                tracing::warn!(
                    "'{}' not a reasonable memory value. using '{}', the default",
                    memory,
                    DEFAULT_RAM_MIB
                );
                DEFAULT_RAM_MIB
            }
        };
    }

    /// Sets the SSH public key. An empty key means none.
    pub fn set_ssh_key(&mut self, key: &str) {
        if !key.is_empty() {
            self.ssh_key = Some(key.to_string());
        }
    }

    /// Parses volume specifiers and allocates their slots, in the order given.
    pub fn add_volumes<S: AsRef<str>>(
        &mut self,
        volumes: &[S],
        ctx: &HostContext,
    ) -> CorectlResult<()> {
        for token in volumes {
            let Some(device) = StorageDevice::parse(token.as_ref(), ctx.get_pwd())? else {
                continue;
            };

            match device.get_kind() {
                StorageKind::Hdd => self.storage.hard_drives.insert(device)?,
                StorageKind::Cdrom => self.storage.cd_drives.insert(device)?,
            }
        }

        Ok(())
    }

    /// Parses network specifiers and allocates their slots, in the order given.
    pub fn add_network_interfaces<S: AsRef<str>>(&mut self, networks: &[S]) -> CorectlResult<()> {
        for token in networks {
            if let Some(nic) = NetworkInterface::parse(token.as_ref())? {
                self.network.raw.insert(nic)?;
            }
        }

        Ok(())
    }

    /// Resolves the cloud-config reference. An empty source means none.
    pub async fn resolve_cloud_config(
        &mut self,
        source: &str,
        ctx: &HostContext,
    ) -> CorectlResult<()> {
        if !source.is_empty() {
            self.cloud_config = Some(CloudConfig::resolve(source, ctx).await?);
        }

        Ok(())
    }

    /// Gives the guest `eth0` if no network interface was requested.
    pub fn ensure_default_nic(&mut self) {
        if self.network.raw.is_empty() {
            tracing::debug!("no network interface requested, adding eth0");
            let _ = self.network.raw.insert(NetworkInterface::raw(0));
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl TryFrom<NetworkEntries> for Network {
    type Error = InvalidDeviceError;

    fn try_from(entries: NetworkEntries) -> Result<Self, Self::Error> {
        if let Some(nic) = entries
            .raw
            .iter()
            .find(|nic| nic.get_kind() != NetworkKind::Raw)
        {
            return Err(InvalidDeviceError::WrongClass(nic.tag_for(nic.get_slot())));
        }

        Ok(Self { raw: entries.raw })
    }
}

impl TryFrom<StorageEntries> for Storage {
    type Error = InvalidDeviceError;

    fn try_from(entries: StorageEntries) -> Result<Self, Self::Error> {
        let misplaced = entries
            .hard_drives
            .iter()
            .find(|d| d.get_kind() != StorageKind::Hdd)
            .or_else(|| {
                entries
                    .cd_drives
                    .iter()
                    .find(|d| d.get_kind() != StorageKind::Cdrom)
            });
        if let Some(device) = misplaced {
            return Err(InvalidDeviceError::WrongClass(
                device.tag_for(device.get_slot()),
            ));
        }

        Ok(Self {
            hard_drives: entries.hard_drives,
            cd_drives: entries.cd_drives,
        })
    }
}

impl Default for VmDescriptor {
    fn default() -> Self {
        Self {
            uuid: Uuid::nil(),
            channel: Channel::default(),
            version: LATEST_VERSION.to_string(),
            cpus: DEFAULT_NUM_VCPUS,
            memory: DEFAULT_RAM_MIB,
            xhyve: PathBuf::from(DEFAULT_XHYVE_PATH),
            extra: String::new(),
            ssh_key: None,
            cloud_config: None,
            network: Network::default(),
            storage: Storage::default(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use crate::InvalidDeviceError;

    use super::*;

    fn context(pwd: &Path) -> HostContext {
        HostContext::builder()
            .uid(501)
            .gid(20)
            .username("core")
            .home(pwd.join(".coreos"))
            .pwd(pwd)
            .build()
    }

    fn scratch_with(files: &[&str]) -> anyhow::Result<TempDir> {
        let dir = TempDir::new()?;
        for file in files {
            std::fs::write(dir.path().join(file), b"")?;
        }
        Ok(dir)
    }

    fn slots(table: &SlotTable<StorageDevice>) -> Vec<(u8, PathBuf)> {
        table
            .iter()
            .map(|d| (d.get_slot(), d.get_path().clone()))
            .collect()
    }

    #[test]
    fn test_descriptor_ram_validation() {
        let mut vm = VmDescriptor::default();

        vm.validate_ram("512");
        assert_eq!(vm.get_memory(), 1024);

        vm.validate_ram("2048");
        assert_eq!(vm.get_memory(), 2048);

        vm.validate_ram("abc");
        assert_eq!(vm.get_memory(), 1024);

        vm.validate_ram("1024");
        assert_eq!(vm.get_memory(), 1024);

        vm.validate_ram("-4096");
        assert_eq!(vm.get_memory(), 1024);
    }

    #[test]
    fn test_descriptor_cpu_validation() {
        let mut vm = VmDescriptor::default();

        vm.validate_cpus("4");
        assert_eq!(vm.get_cpus(), 4);

        vm.validate_cpus("four");
        assert_eq!(vm.get_cpus(), 1);

        vm.validate_cpus("0");
        assert_eq!(vm.get_cpus(), 1);

        vm.validate_cpus("");
        assert_eq!(vm.get_cpus(), 1);

        vm.validate_cpus("256");
        assert_eq!(vm.get_cpus(), 256);

        vm.validate_cpus("-2");
        assert_eq!(vm.get_cpus(), 1);
    }

    #[test]
    fn test_descriptor_uuid_validation() {
        let mut vm = VmDescriptor::default();

        vm.check_uuid("5a3f1c7e-0b1d-4e2a-9c3b-7d6e5f4a3b2c");
        assert_eq!(
            vm.get_uuid().to_string(),
            "5a3f1c7e-0b1d-4e2a-9c3b-7d6e5f4a3b2c"
        );

        for input in ["random", "not-a-uuid", "", "5a3f1c7e-0b1d-4e2a-9c3b"] {
            vm.check_uuid(input);
            let uuid = vm.get_uuid();
            assert_eq!(uuid.get_version(), Some(uuid::Version::Random), "{input}");
            assert_eq!(uuid.get_variant(), uuid::Variant::RFC4122, "{input}");
        }

        vm.check_uuid("random");
        let first = vm.get_uuid();
        vm.check_uuid("random");
        assert_ne!(first, vm.get_uuid());
    }

    #[test]
    fn test_descriptor_channel_and_version() {
        let mut vm = VmDescriptor::default();

        vm.set_channel("stable");
        assert_eq!(vm.get_channel(), Channel::Stable);

        vm.set_channel("nightly");
        assert_eq!(vm.get_channel(), Channel::Alpha);

        vm.set_version("");
        assert_eq!(vm.get_version(), LATEST_VERSION);

        vm.set_version("845.0.0");
        assert_eq!(vm.get_version(), "845.0.0");
    }

    #[test]
    fn test_descriptor_ssh_key_and_extra() {
        let mut vm = VmDescriptor::default();
        vm.set_ssh_key("");
        assert_eq!(vm.get_ssh_key(), &None);

        vm.set_ssh_key("ssh-rsa AAAA core@host");
        assert_eq!(vm.get_ssh_key().as_deref(), Some("ssh-rsa AAAA core@host"));

        vm.set_extra("-s 5,virtio-rnd");
        assert_eq!(vm.get_extra(), "-s 5,virtio-rnd");
    }

    #[test]
    fn test_descriptor_check_xhyve() -> anyhow::Result<()> {
        let mut vm = VmDescriptor::default();
        assert!(matches!(
            vm.check_xhyve("/definitely/not/here/xhyve"),
            Err(CorectlError::HypervisorNotFound(..))
        ));

        vm.check_xhyve("sh")?;
        assert!(vm.get_xhyve().is_absolute());
        Ok(())
    }

    #[test]
    fn test_descriptor_volume_slots_are_independent_per_class() -> anyhow::Result<()> {
        let dir = scratch_with(&["a.img", "b.img", "boot.iso"])?;
        let ctx = context(dir.path());
        let mut vm = VmDescriptor::default();

        // Empty tokens are skipped and the two classes interleave freely.
        vm.add_volumes(&["cdrom0@boot.iso", "vda@a.img", "", "vdb@b.img"], &ctx)?;

        assert_eq!(
            slots(vm.get_storage().get_hard_drives()),
            [(0, dir.path().join("a.img")), (1, dir.path().join("b.img"))]
        );
        assert_eq!(
            slots(vm.get_storage().get_cd_drives()),
            [(0, dir.path().join("boot.iso"))]
        );
        Ok(())
    }

    #[test]
    fn test_descriptor_volume_order_matters() -> anyhow::Result<()> {
        let dir = scratch_with(&["a.img", "b.img"])?;
        let ctx = context(dir.path());

        let mut vm = VmDescriptor::default();
        let result = vm.add_volumes(&["vdb@b.img", "vda@a.img"], &ctx);
        assert!(matches!(
            result,
            Err(CorectlError::InvalidDevice(InvalidDeviceError::SlotGap(ref s, ref p)))
                if s == "vdb" && p == "vda"
        ));

        let mut vm = VmDescriptor::default();
        let result = vm.add_volumes(&["vda@a.img", "vda@b.img"], &ctx);
        assert!(matches!(
            result,
            Err(CorectlError::InvalidDevice(InvalidDeviceError::DuplicateSlot(ref s))) if s == "vda"
        ));

        let mut vm = VmDescriptor::default();
        let result = vm.add_volumes(&["cdrom1@a.img"], &ctx);
        assert!(matches!(
            result,
            Err(CorectlError::InvalidDevice(InvalidDeviceError::SlotGap(..)))
        ));
        Ok(())
    }

    #[test]
    fn test_descriptor_network_slots() -> anyhow::Result<()> {
        let mut vm = VmDescriptor::default();
        vm.add_network_interfaces(&["eth0", "eth1"])?;
        assert_eq!(vm.get_network().get_raw().len(), 2);

        let mut vm = VmDescriptor::default();
        assert!(matches!(
            vm.add_network_interfaces(&["eth1"]),
            Err(CorectlError::InvalidDevice(InvalidDeviceError::SlotGap(..)))
        ));

        // eth9 is well-formed; it fails only because eth0 is missing.
        let mut vm = VmDescriptor::default();
        assert!(matches!(
            vm.add_network_interfaces(&["eth9"]),
            Err(CorectlError::InvalidDevice(InvalidDeviceError::SlotGap(ref s, ref p)))
                if s == "eth9" && p == "eth8"
        ));

        let mut vm = VmDescriptor::default();
        assert!(matches!(
            vm.add_network_interfaces(&["eth0", "eth0"]),
            Err(CorectlError::InvalidDevice(InvalidDeviceError::DuplicateSlot(..)))
        ));
        Ok(())
    }

    #[test]
    fn test_descriptor_tap_is_skipped_not_fatal() -> anyhow::Result<()> {
        let mut vm = VmDescriptor::default();
        vm.add_network_interfaces(&["tap0", "eth0", "tap1"])?;
        assert_eq!(vm.get_network().get_raw().len(), 1);

        let mut vm = VmDescriptor::default();
        assert!(matches!(
            vm.add_network_interfaces(&["tap"]),
            Err(CorectlError::InvalidDevice(InvalidDeviceError::NetworkFormat(..)))
        ));
        Ok(())
    }

    #[test]
    fn test_descriptor_default_nic() -> anyhow::Result<()> {
        let mut vm = VmDescriptor::default();
        vm.ensure_default_nic();
        assert_eq!(
            vm.get_network().get_raw().iter().collect::<Vec<_>>(),
            [&NetworkInterface::raw(0)]
        );

        let mut vm = VmDescriptor::default();
        vm.add_network_interfaces(&["eth0", "eth1"])?;
        vm.ensure_default_nic();
        assert_eq!(vm.get_network().get_raw().len(), 2);
        Ok(())
    }

    #[test]
    fn test_descriptor_json_round_trip() -> anyhow::Result<()> {
        let dir = scratch_with(&["a.img", "b.img", "boot.iso", "user-data"])?;
        let ctx = context(dir.path());

        let mut vm = VmDescriptor::default();
        vm.check_uuid("random");
        vm.set_ssh_key("ssh-ed25519 AAAA");
        vm.add_volumes(&["vda@a.img", "cdrom0@boot.iso", "vdb@b.img"], &ctx)?;
        vm.add_network_interfaces(&["eth0", "eth1", "eth2"])?;
        vm.cloud_config = Some(CloudConfig::Local(dir.path().join("user-data")));

        let json = serde_json::to_string_pretty(&vm)?;
        let back: VmDescriptor = serde_json::from_str(&json)?;

        assert_eq!(back, vm);
        assert_eq!(
            slots(back.get_storage().get_hard_drives()),
            slots(vm.get_storage().get_hard_drives())
        );
        assert_eq!(
            slots(back.get_storage().get_cd_drives()),
            slots(vm.get_storage().get_cd_drives())
        );
        Ok(())
    }

    #[test]
    fn test_descriptor_json_layout() -> anyhow::Result<()> {
        let dir = scratch_with(&["a.img"])?;
        let ctx = context(dir.path());

        let mut vm = VmDescriptor::default();
        vm.add_volumes(&["vda@a.img"], &ctx)?;
        vm.ensure_default_nic();

        let json = serde_json::to_value(&vm)?;
        assert_eq!(json["network"]["raw"]["0"]["type"], "Raw");
        assert_eq!(json["storage"]["hard_drives"]["0"]["type"], "HDD");
        assert_eq!(json["storage"]["cd_drives"], serde_json::json!({}));
        assert_eq!(json["memory"], 1024);
        assert!(json.get("ssh_key").is_none());
        Ok(())
    }

    #[test]
    fn test_descriptor_json_rejects_devices_in_wrong_class() -> anyhow::Result<()> {
        let json = serde_json::json!({
            "hard_drives": { "0": { "type": "CDROM", "slot": 0, "path": "/tmp/boot.iso" } },
        });
        assert!(serde_json::from_value::<Storage>(json).is_err());

        let json = serde_json::json!({
            "cd_drives": { "0": { "type": "HDD", "slot": 0, "path": "/tmp/disk.img" } },
        });
        assert!(serde_json::from_value::<Storage>(json).is_err());

        let json = serde_json::json!({ "raw": { "0": { "type": "Tap", "slot": 0 } } });
        assert!(serde_json::from_value::<Network>(json).is_err());

        let json = serde_json::json!({
            "hard_drives": { "0": { "type": "HDD", "slot": 0, "path": "/tmp/disk.img" } },
        });
        let storage: Storage = serde_json::from_value(json)?;
        assert_eq!(storage.get_hard_drives().len(), 1);
        assert!(storage.get_cd_drives().is_empty());
        Ok(())
    }
}
