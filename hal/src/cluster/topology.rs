//! Boot-time cluster discovery
//!
//! Run once on the boot core before any other core is released:
//!
//! 1. read `CLNR_BCR_0`; version 0 means there is no cluster and nothing
//!    else is touched
//! 2. find the memory map entry holding the kernel link address and open
//!    NoC master window 0 onto it, so cluster traffic for kernel memory is
//!    routed to DDR
//! 3. program the peripheral aperture and the shared-memory window
//!
//! All three windows are programmed in MiB units.

use heapless::Vec;

use super::regs::{
    CLN_MST_NOC_0_0_ADDR, CLN_MST_NOC_0_0_SIZE, CLN_PER_0_BASE, CLN_PER_0_SIZE, CLN_SHMEM_ADDR,
    CLN_SHMEM_SIZE, WINDOW_SHIFT, bcr_num_cores, bcr_version,
};
use super::{Cluster, ClusterBus, ClusterError, ClusterResult};
use crate::arch::MemoryRegion;

/// Maximum number of windows discovery programs
pub const MAX_WINDOWS: usize = 3;

/// Which cluster aperture a window was programmed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// NoC master window routing kernel memory
    NocMaster,
    /// Peripheral aperture
    Peripheral,
    /// Cluster shared memory
    SharedMemory,
}

/// One programmed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgrammedWindow {
    /// Aperture
    pub kind: WindowKind,
    /// Physical range it covers
    pub region: MemoryRegion,
}

/// Result of cluster discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    /// Cluster version, 0 when there is no cluster
    pub version: u8,
    /// Cores in the cluster (1 when there is no cluster)
    pub num_cores: u32,
    /// Windows programmed, in programming order
    pub windows: Vec<ProgrammedWindow, MAX_WINDOWS>,
}

impl Topology {
    /// Window of the given kind, if it was programmed
    pub fn window(&self, kind: WindowKind) -> Option<&ProgrammedWindow> {
        self.windows.iter().find(|w| w.kind == kind)
    }
}

/// Encode a window as (base, size) register values in MiB
fn window_regs(region: MemoryRegion) -> ClusterResult<(u32, u32)> {
    let mask = (1u64 << WINDOW_SHIFT) - 1;
    if region.start & mask != 0 || region.size & mask != 0 {
        return Err(ClusterError::WindowMisaligned {
            start: region.start,
            size: region.size,
        });
    }
    Ok((
        (region.start >> WINDOW_SHIFT) as u32,
        (region.size >> WINDOW_SHIFT) as u32,
    ))
}

impl<B: ClusterBus> Cluster<B> {
    /// Detect the cluster and program its address windows
    ///
    /// `memory_map` lists the physical memory regions of the platform. The
    /// controller only counts as present once every window is programmed;
    /// a failed discovery leaves it absent and every SCM operation a no-op.
    pub fn discover_topology(&mut self, memory_map: &[MemoryRegion]) -> ClusterResult<Topology> {
        self.version = 0;
        let bcr = self.bus.read_build_config();
        let version = bcr_version(bcr);

        if version == 0 {
            debug_print!(INFO, "No cluster hardware found");
            return Ok(Topology {
                version,
                num_cores: 1,
                windows: Vec::new(),
            });
        }
        let num_cores = bcr_num_cores(bcr);
        debug_print!(INFO, "Cluster v{} with {} cores", version, num_cores);

        let link_addr = self.config.kernel_link_addr;
        let kernel_mem = memory_map
            .iter()
            .copied()
            .find(|region| region.contains(link_addr))
            .ok_or(ClusterError::KernelNotMapped { addr: link_addr })?;

        let plan = [
            (WindowKind::NocMaster, kernel_mem, CLN_MST_NOC_0_0_ADDR, CLN_MST_NOC_0_0_SIZE),
            (WindowKind::Peripheral, self.config.peripheral_window, CLN_PER_0_BASE, CLN_PER_0_SIZE),
            (WindowKind::SharedMemory, self.config.shmem_window, CLN_SHMEM_ADDR, CLN_SHMEM_SIZE),
        ];

        // Everything fallible happens before the first write so a bad
        // window leaves the routing untouched.
        let mut encoded = [(0u32, 0u32); MAX_WINDOWS];
        for (slot, &(_, region, _, _)) in encoded.iter_mut().zip(plan.iter()) {
            *slot = window_regs(region)?;
        }
        let programmed = plan.map(|(kind, region, _, _)| ProgrammedWindow { kind, region });
        let windows = Vec::from_slice(&programmed).map_err(|()| ClusterError::TooManyWindows {
            capacity: MAX_WINDOWS,
        })?;

        for (&(kind, region, base_reg, size_reg), &(base, size)) in plan.iter().zip(encoded.iter()) {
            self.bus.write(base_reg, base);
            self.bus.write(size_reg, size);
            debug_print!(
                INFO,
                "  {:?} window {:#x}..{:#x}",
                kind,
                region.start,
                region.end()
            );
        }

        self.version = version;
        Ok(Topology {
            version,
            num_cores,
            windows,
        })
    }
}
