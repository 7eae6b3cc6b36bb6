//! # field_viewer
//!
//! A window onto the particle field.  A hand over the window pulls the
//! particles in or blows them apart.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: the mouse pointer stands in for a hand.
//! * `leap`: **Hardware mode**: reads a real LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | move pointer | move the hand (leave the window to drop it) |
//! | `G` / left button | gather: particles spiral into the hand |
//! | `S` / right button | scatter: push particles away, bloom on entry |
//! | `R` | re-roll every particle |
//! | `Q` / `Escape` | quit |

pub mod app;
pub mod gesture;
pub mod raster;
pub mod visualizer;
