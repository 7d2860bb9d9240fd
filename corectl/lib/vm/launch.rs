use getset::Getters;

use crate::{management::LocalImage, HostContext};

use super::{CloudConfig, VmDescriptor};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The xhyve invocation for a finished [`VmDescriptor`].
///
/// The argument list is laid out as
///
/// ```text
/// -s 0:0,hostbridge -l com1,stdio -s 31,lpc -U <uuid> -m <MB>M -c <cpus> -A
/// [<extra>]
/// -s 2:<slot>,virtio-net              one per raw interface
/// -s 3:<slot>,ahci-cd,<path>          one per CD-ROM drive
/// -s 4:<slot>,virtio-blk,<path>       one per hard drive
/// -f kexec,<vmlinuz>,<initrd>,<cmdline>
/// ```
///
/// with devices in slot order inside each class.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct LaunchSpec {
    /// Every argument except the trailing `-f kexec,...` pair.
    args: Vec<String>,

    /// The guest kernel command line.
    cmdline: String,

    /// The `kexec,<vmlinuz>,<initrd>,<cmdline>` boot token.
    kexec: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LaunchSpec {
    /// Builds the launch spec for `vm`. Nothing is read from disk.
    pub fn build(vm: &VmDescriptor, ctx: &HostContext) -> Self {
        let mut args: Vec<String> = vec![
            "-s".into(),
            "0:0,hostbridge".into(),
            "-l".into(),
            "com1,stdio".into(),
            "-s".into(),
            "31,lpc".into(),
            "-U".into(),
            vm.get_uuid().to_string(),
            "-m".into(),
            format!("{}M", vm.get_memory()),
            "-c".into(),
            vm.get_cpus().to_string(),
            "-A".into(),
        ];

        if !vm.get_extra().is_empty() {
            args.push(vm.get_extra().clone());
        }

        for nic in vm.get_network().get_raw() {
            args.push("-s".into());
            args.push(format!("2:{},virtio-net", nic.get_slot()));
        }

        for cd in vm.get_storage().get_cd_drives() {
            args.push("-s".into());
            args.push(format!("3:{},ahci-cd,{}", cd.get_slot(), cd.get_path().display()));
        }

        for hdd in vm.get_storage().get_hard_drives() {
            args.push("-s".into());
            args.push(format!(
                "4:{},virtio-blk,{}",
                hdd.get_slot(),
                hdd.get_path().display()
            ));
        }

        let cmdline = kernel_cmdline(vm, ctx);
        let image = LocalImage::at(ctx.get_home(), vm.get_channel(), vm.get_version());
        let kexec = format!(
            "kexec,{},{},{}",
            image.get_vmlinuz().display(),
            image.get_initrd().display(),
            cmdline
        );

        Self {
            args,
            cmdline,
            kexec,
        }
    }

    /// Returns the complete xhyve argument vector, boot token included.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push("-f".into());
        argv.push(self.kexec.clone());
        argv
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn kernel_cmdline(vm: &VmDescriptor, ctx: &HostContext) -> String {
    let mut cmdline = format!(
        "earlyprintk=serial console=ttyS0 coreos.autologin localuser={} uuid={}",
        ctx.get_username(),
        vm.get_uuid()
    );

    if let Some(key) = vm.get_ssh_key() {
        cmdline.push_str(&format!(" sshkey=\"{}\"", key));
    }

    if let Some(CloudConfig::Remote(url)) = vm.get_cloud_config() {
        cmdline.push_str(&format!(" cloud-config-url={}", url));
    }

    cmdline
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
