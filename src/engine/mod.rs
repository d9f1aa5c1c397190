//! Signal processing engine: normalize → gate → reconcile → plan → render.

pub mod message;
pub mod normalizer;
pub mod pipeline;
pub mod reconciler;
pub mod risk;
