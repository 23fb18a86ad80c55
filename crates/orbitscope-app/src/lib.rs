//! Orbitscope application: wires config, trajectories, the scene and the
//! camera into a scripted frame loop.

pub mod demo;
pub mod export;
pub mod frame_loop;
pub mod script;
pub mod settings;
