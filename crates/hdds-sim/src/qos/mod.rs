// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Quality of Service policies and the RxO compatibility checker.
//!
//! A [`QosProfile`] is attached to every writer and reader. Before a writer
//! and reader on the same topic are matched, [`check`] compares the writer's
//! offered profile with the reader's requested profile.
//!
//! ```
//! use hdds_sim::qos::{check, PolicyKind, QosProfile};
//!
//! let result = check(&QosProfile::best_effort(), &QosProfile::reliable());
//! assert!(!result.compatible);
//! assert_eq!(result.violations, vec![PolicyKind::Reliability]);
//! ```

pub mod compat;
pub mod liveliness;
pub mod ownership;
pub mod partition;
pub mod profile;
pub mod reliability;
pub mod timing;

pub use compat::{check, check_matrix, Compatibility, PolicyKind};
pub use liveliness::{Liveliness, LivelinessKind};
pub use ownership::Ownership;
pub use partition::Partition;
pub use profile::QosProfile;
pub use reliability::{Durability, History, Reliability};
pub use timing::{Deadline, Lifespan};
