use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    config::{
        DEFAULT_CHANNEL, DEFAULT_EXPORTS_PATH, DEFAULT_NUM_VCPUS, DEFAULT_RAM_MIB,
        DEFAULT_XHYVE_PATH, LATEST_VERSION, RANDOM_UUID,
    },
    vm::RunRequest,
};

use super::styles;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// corectl - CoreOS over macOS made simple
#[derive(Debug, Parser)]
#[command(name = "corectl", author, about, version, styles=styles::styles())]
pub struct CorectlArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: CorectlSubcommand,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// corectl home directory, holding `images/` and `running/`
    #[arg(long, global = true, value_name = "PATH")]
    pub home: Option<PathBuf>,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum CorectlSubcommand {
    /// Start a new CoreOS VM and attach to its console
    #[command(name = "run", disable_version_flag = true)]
    Run(RunArgs),
}

/// Arguments for `corectl run`
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// CoreOS channel
    #[arg(long, default_value = DEFAULT_CHANNEL)]
    pub channel: String,

    /// CoreOS version
    #[arg(long, default_value = LATEST_VERSION)]
    pub version: String,

    /// VM's UUID
    #[arg(long, default_value = RANDOM_UUID)]
    pub uuid: String,

    /// VM's RAM, in MiB
    #[arg(long, default_value_t = DEFAULT_RAM_MIB.to_string())]
    pub memory: String,

    /// VM's vCPUs
    #[arg(long, default_value_t = DEFAULT_NUM_VCPUS.to_string())]
    pub cpus: String,

    /// cloud-config file location (either URL or local path)
    #[arg(long, alias = "cloud_config", default_value = "")]
    pub cloud_config: String,

    /// VM's default ssh key
    #[arg(long, default_value = "")]
    pub sshkey: String,

    /// xhyve binary to use
    #[arg(long, default_value = DEFAULT_XHYVE_PATH)]
    pub xhyve: String,

    /// additional arguments to xhyve hypervisor
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub extra: String,

    /// append disk volumes to VM (`vd[a-z]@PATH` or `cdrom[0-9]@PATH`)
    #[arg(long, use_value_delimiter = true, value_delimiter = ',')]
    pub volume: Vec<String>,

    /// append additional network interfaces to VM (`eth[0-9]`)
    #[arg(long, use_value_delimiter = true, value_delimiter = ',')]
    pub net: Vec<String>,

    /// NFS exports file to share `/Users` through
    #[arg(long, default_value = DEFAULT_EXPORTS_PATH, value_name = "PATH")]
    pub exports: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RunArgs {
    /// Returns the raw VM request these flags describe.
    pub fn to_request(&self) -> RunRequest {
        RunRequest::builder()
            .channel(self.channel.clone())
            .version(self.version.clone())
            .uuid(self.uuid.clone())
            .memory(self.memory.clone())
            .cpus(self.cpus.clone())
            .cloud_config(self.cloud_config.clone())
            .ssh_key(self.sshkey.clone())
            .xhyve(self.xhyve.clone())
            .extra(self.extra.clone())
            .volumes(self.volume.clone())
            .networks(self.net.clone())
            .build()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
