//! Data types shared by the gate and its middleware.

/// Allow/deny outcome and denial rendering
pub mod decision;
/// Request parameter access
pub mod params;
/// Denial content types
pub mod response_format;
