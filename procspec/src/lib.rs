//! Validation and normalization of process-manager ecosystem files.
//!
//! An ecosystem file lists the processes an external supervisor should run.
//! [`descriptor::normalize`] turns one loosely-typed record into a
//! [`ProcessDescriptor`] with every default filled in, and
//! [`Ecosystem::load`] does the same for a whole file, reporting every
//! invalid record at once.

pub mod cli;
pub mod common;
pub mod descriptor;
pub mod ecosystem;

pub use descriptor::{normalize, ExecMode, ProcessDescriptor, RawDescriptor, Watch};
pub use ecosystem::{Ecosystem, EcosystemError};
