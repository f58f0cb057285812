//! Cluster bring-up through the indirect aux window
//!
//! `SimAux` exposes a `SimBus` the way the core sees the hardware: an aux
//! register space where `CLNR_ADDR` selects a cluster register and
//! `CLNR_DATA` moves its value. Driving `IndirectBus` over it exercises the
//! same path a board port uses.

use std::thread;

use arc_hal::arch::MemoryRegion;
use arc_hal::arch::aux_regs::AuxRegisters;
use arc_hal::cluster::regs::{
    ARC_REG_CLNR_ADDR, ARC_REG_CLNR_BCR_0, ARC_REG_CLNR_DATA, CLN_CACHE_CMD, bcr_encode,
};
use arc_hal::cluster::sim::SimBus;
use arc_hal::cluster::{CacheOp, ClusterBus, IndirectBus, ScmStatus, WindowKind};
use arc_hal::{Cluster, ClusterConfig, ClusterError, PollPolicy};

struct SimAux {
    selected: u32,
    sim: SimBus,
}

impl SimAux {
    fn new(sim: SimBus) -> Self {
        Self { selected: 0, sim }
    }
}

impl AuxRegisters for SimAux {
    fn read_aux(&mut self, reg: u32) -> u32 {
        match reg {
            ARC_REG_CLNR_BCR_0 => self.sim.read_build_config(),
            ARC_REG_CLNR_ADDR => self.selected,
            ARC_REG_CLNR_DATA => self.sim.read(self.selected),
            _ => 0,
        }
    }

    fn write_aux(&mut self, reg: u32, value: u32) {
        match reg {
            ARC_REG_CLNR_ADDR => self.selected = value,
            ARC_REG_CLNR_DATA => self.sim.write(self.selected, value),
            _ => {}
        }
    }
}

const MIB: u64 = 1 << 20;

fn memory_map() -> [MemoryRegion; 1] {
    [MemoryRegion::new(0x8000_0000, 512 * MIB)]
}

fn booted(sim: SimBus, config: ClusterConfig) -> Cluster<IndirectBus<SimAux>> {
    let mut cluster = Cluster::new(IndirectBus::new(SimAux::new(sim)), config);
    cluster.discover_topology(&memory_map()).unwrap();
    cluster.enable().unwrap();
    cluster
}

fn sim_of(cluster: Cluster<IndirectBus<SimAux>>) -> SimBus {
    cluster.into_bus().into_inner().sim
}

#[test]
fn boot_sequence_discovers_then_enables() {
    let mut cluster = Cluster::new(
        IndirectBus::new(SimAux::new(SimBus::new(bcr_encode(3, 8)).with_busy_polls(4))),
        ClusterConfig::new(),
    );

    let topology = cluster.discover_topology(&memory_map()).unwrap();
    assert_eq!(topology.version, 3);
    assert_eq!(topology.num_cores, 8);
    assert_eq!(topology.windows.len(), 3);
    assert_eq!(
        topology.window(WindowKind::NocMaster).map(|w| w.region),
        Some(MemoryRegion::new(0x8000_0000, 512 * MIB))
    );

    cluster.enable().unwrap();
    assert!(cluster.is_enabled());
    cluster.flush_range(0x8000_1000, 0x8000_3000).unwrap();
    cluster.dma_sync_for_cpu(0x8000_4010, 100).unwrap();

    let sim = sim_of(cluster);
    assert_eq!(sim.commands_while_busy, 0);
    assert_eq!(sim.dropped_writes, 0);
    assert_eq!(sim.commands.len(), 3);
    assert_eq!(sim.commands[1].cmd.op(), Some(CacheOp::CleanInvalidate));
    assert_eq!((sim.commands[1].low, sim.commands[1].high), (0x8000_1000, 0x8000_3000));
    assert_eq!((sim.commands[2].low, sim.commands[2].high), (0x8000_4000, 0x8000_4080));
    assert!(sim.status().contains(ScmStatus::EN));
}

#[test]
fn missing_cluster_stays_silent() {
    let cluster = booted(SimBus::new(0), ClusterConfig::new());
    assert!(!cluster.is_present());

    let sim = sim_of(cluster);
    assert!(sim.writes.is_empty());
    assert!(sim.commands.is_empty());
}

#[test]
fn shared_controller_never_overlaps_commands() {
    const FLUSHES: u64 = 5;
    let cluster = spin::Mutex::new(booted(
        SimBus::new(bcr_encode(1, 4)).with_busy_polls(3),
        ClusterConfig::new(),
    ));

    thread::scope(|s| {
        for core in 0..4u64 {
            let cluster = &cluster;
            s.spawn(move || {
                for i in 0..FLUSHES {
                    let base = 0x8000_0000 + (core * FLUSHES + i) * 0x1000;
                    cluster.lock().flush_range(base, base + 0x1000).unwrap();
                }
            });
        }
    });

    let sim = sim_of(cluster.into_inner());
    assert_eq!(sim.commands_while_busy, 0);
    assert_eq!(sim.commands.len() as u64, 1 + 4 * FLUSHES);
    let cmd_writes = sim.writes.iter().filter(|w| w.reg == CLN_CACHE_CMD).count();
    assert_eq!(cmd_writes as u64, 1 + 4 * FLUSHES);
}

#[test]
fn stuck_controller_reports_timeout() {
    let config = ClusterConfig::new().with_poll(PollPolicy::Bounded { max_polls: 8 });
    let mut cluster = booted(SimBus::new(bcr_encode(1, 2)), config);
    cluster.bus_mut().aux_mut().sim.stuck = true;

    assert!(matches!(
        cluster.clean_range(0x8000_0000, 0x8000_0040),
        Err(ClusterError::Timeout { polls: 8, .. })
    ));
}

#[test]
fn failed_discovery_keeps_scm_dark() {
    let config = ClusterConfig::new().with_kernel_link_addr(0x4000_0000);
    let mut cluster = Cluster::new(
        IndirectBus::new(SimAux::new(SimBus::new(bcr_encode(1, 2)))),
        config,
    );

    assert_eq!(
        cluster.discover_topology(&memory_map()),
        Err(ClusterError::KernelNotMapped { addr: 0x4000_0000 })
    );
    cluster.enable().unwrap();
    cluster.flush_all().unwrap();
    assert!(!cluster.is_enabled());

    let sim = sim_of(cluster);
    assert!(sim.writes.is_empty());
    assert_eq!(sim.status_reads, 0);
}

#[test]
fn debug_print_is_usable_from_dependents() {
    arc_hal::debug_print!(INFO, "cluster v{} ready", 1);
    arc_hal::debug_print!(TRACE, "no arguments");
}
