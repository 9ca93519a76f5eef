//! Descriptor table over the closed set of task kinds.
//!
//! The kinds themselves are concrete types constructed directly by the
//! pipeline builders — there is no name-based dispatch. This table only
//! feeds the CLI's `tasks` listing.

/// Describes one task kind.
#[derive(Debug, Clone, Copy)]
pub struct TaskDescriptor {
    /// Stable identifier (matches [`Task::name`](radon_core::Task::name)).
    pub id: &'static str,
    /// Named input ports, in index order.
    pub inputs: &'static [&'static str],
    /// Named output ports, in index order.
    pub outputs: &'static [&'static str],
    /// One-line behavior summary.
    pub summary: &'static str,
}

/// All task kinds known to the engine.
pub fn task_descriptors() -> &'static [TaskDescriptor] {
    const DESCRIPTORS: &[TaskDescriptor] = &[
        TaskDescriptor {
            id: "read",
            inputs: &[],
            outputs: &["frames"],
            summary: "stream sliced, ROI-cropped frames from a stack source",
        },
        TaskDescriptor {
            id: "write",
            inputs: &["frames"],
            outputs: &[],
            summary: "write incoming frames to a stack file (optionally appending)",
        },
        TaskDescriptor {
            id: "bin",
            inputs: &["frames"],
            outputs: &["frames"],
            summary: "downsample each frame by k×k block means",
        },
        TaskDescriptor {
            id: "stack",
            inputs: &["frames"],
            outputs: &["volume"],
            summary: "collect a fixed number of frames into one volume",
        },
        TaskDescriptor {
            id: "flatten",
            inputs: &["volume"],
            outputs: &["frame"],
            summary: "reduce a volume to its element-wise median",
        },
        TaskDescriptor {
            id: "average",
            inputs: &["frames"],
            outputs: &["frame"],
            summary: "streaming element-wise mean of all incoming frames",
        },
        TaskDescriptor {
            id: "interpolate",
            inputs: &["before", "after"],
            outputs: &["frames"],
            summary: "linear blend between two flats across the scan",
        },
        TaskDescriptor {
            id: "flat-field-correct",
            inputs: &["projections", "dark", "flat"],
            outputs: &["corrected"],
            summary: "normalize projections against dark and flat references",
        },
        TaskDescriptor {
            id: "transpose-projections",
            inputs: &["projections"],
            outputs: &["sinograms"],
            summary: "reorganize a projection stack into per-row sinograms",
        },
    ];
    DESCRIPTORS
}
