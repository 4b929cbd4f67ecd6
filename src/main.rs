mod commands;
mod graph;
mod logging;
mod parser;
mod topology;
mod tui;
mod workspace;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::device::{DeviceChanges, NewDevice};
use crate::commands::list::ListFilter;
use crate::graph::model::{DeviceType, Status};

#[derive(Parser)]
#[command(
    name = "netmap",
    about = "Network device inventory with per-profile topology maps"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create netmap/inventory.json and netmap/config.netmap here
    Init {
        /// Seed the inventory with the sample network
        #[arg(long)]
        sample: bool,
    },
    /// List devices
    List {
        /// Only devices assigned to this profile
        #[arg(long)]
        profile: Option<String>,
        /// WAP, Server, Laptop or DPO
        #[arg(long = "type")]
        device_type: Option<DeviceType>,
        /// Online or Offline
        #[arg(long)]
        status: Option<Status>,
        /// Case-insensitive match on name, ip, mac or location
        #[arg(long)]
        search: Option<String>,
    },
    /// Manage profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Manage devices
    #[command(subcommand)]
    Device(DeviceCommand),
    /// Open the interactive topology map
    View {
        /// Launch with the built-in sample network (no inventory required)
        #[arg(long)]
        demo: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// List profiles; the active one is marked with `*`
    List,
    /// Show one profile and where its devices sit
    Show { id: String },
    /// Create a profile using the configured defaults
    Add {
        id: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Map image reference (URL or path)
        #[arg(long)]
        background: Option<String>,
    },
    /// Delete a profile and every position stored for it
    Delete { id: String },
    /// Add a device to a profile
    Assign { device: String, profile: String },
    /// Remove a device from a profile
    Unassign { device: String, profile: String },
    /// Make a profile the one `view` opens on
    Activate { id: String },
}

#[derive(Subcommand)]
enum DeviceCommand {
    /// Add a device
    Add {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        device_type: DeviceType,
        #[arg(long)]
        ip: String,
        #[arg(long)]
        mac: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value = "offline")]
        status: Status,
    },
    /// Change fields of an existing device
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        device_type: Option<DeviceType>,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        mac: Option<String>,
        /// Remove the stored MAC address
        #[arg(long, conflicts_with = "mac")]
        clear_mac: bool,
        #[arg(long)]
        location: Option<String>,
        /// Remove the stored location
        #[arg(long, conflicts_with = "location")]
        clear_location: bool,
        #[arg(long)]
        last_seen: Option<String>,
    },
    /// Delete a device and every link to it
    Delete { id: String },
    /// Link `source` to `target`
    Connect { source: String, target: String },
    /// Remove the link between two devices in both directions
    Disconnect { a: String, b: String },
    /// Set a device's position (percent, 0-100) on a profile
    #[command(allow_negative_numbers = true)]
    Place {
        id: String,
        profile: String,
        x: f64,
        y: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = workspace::find_root().ok();
    logging::init(root.as_deref())?;

    match cli.command {
        Command::Init { sample } => commands::init::run(sample),
        Command::List {
            profile,
            device_type,
            status,
            search,
        } => commands::list::run(&ListFilter {
            profile,
            device_type,
            status,
            search,
        }),
        Command::Profile(cmd) => run_profile(&require_root(root)?, cmd),
        Command::Device(cmd) => run_device(&require_root(root)?, cmd),
        Command::View { demo } => commands::view::run(demo),
    }
}

fn require_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => workspace::find_root(),
    }
}

fn run_profile(root: &Path, cmd: ProfileCommand) -> Result<()> {
    use commands::profile;
    match cmd {
        ProfileCommand::List => profile::list(root),
        ProfileCommand::Show { id } => profile::show(root, &id),
        ProfileCommand::Add {
            id,
            name,
            description,
            background,
        } => profile::add(root, &id, &name, description, background),
        ProfileCommand::Delete { id } => profile::delete(root, &id),
        ProfileCommand::Assign { device, profile } => profile::assign(root, &device, &profile),
        ProfileCommand::Unassign { device, profile } => {
            profile::unassign(root, &device, &profile)
        }
        ProfileCommand::Activate { id } => profile::activate(root, &id),
    }
}

fn run_device(root: &Path, cmd: DeviceCommand) -> Result<()> {
    use commands::device;
    match cmd {
        DeviceCommand::Add {
            id,
            name,
            device_type,
            ip,
            mac,
            location,
            status,
        } => device::add(
            root,
            NewDevice {
                id,
                name,
                device_type,
                ip,
                mac,
                location,
                status,
            },
        ),
        DeviceCommand::Update {
            id,
            name,
            device_type,
            status,
            ip,
            mac,
            clear_mac,
            location,
            clear_location,
            last_seen,
        } => device::update(
            root,
            &id,
            DeviceChanges {
                name,
                device_type,
                status,
                ip,
                mac,
                clear_mac,
                location,
                clear_location,
                last_seen,
            },
        ),
        DeviceCommand::Delete { id } => device::delete(root, &id),
        DeviceCommand::Connect { source, target } => device::connect(root, &source, &target),
        DeviceCommand::Disconnect { a, b } => device::disconnect(root, &a, &b),
        DeviceCommand::Place { id, profile, x, y } => device::place(root, &id, &profile, x, y),
    }
}
