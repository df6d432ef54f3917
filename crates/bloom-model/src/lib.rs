//! A mixed-layer plankton succession model for a subarctic shelf sea.
//!
//! Fourteen coupled pools are integrated on an hourly step: four
//! phytoplankton groups (diatoms, flagellates, dinoflagellates and the
//! coccolithophore *Emiliania huxleyi*), two zooplankton grazers, three
//! nutrients, detritus, attached and free coccoliths, dissolved inorganic
//! carbon and total alkalinity. Light limitation comes from a three-layer
//! optical model, the carbonate system is solved at every step, and air-sea
//! CO2 exchange closes the carbon budget.
//!
//! [`driver::Simulation`] runs the multi-year integration against an hourly
//! [`forcing::ForcingLibrary`], emitting daily records and diagnostics
//! through an [`driver::OutputSink`].

pub mod carbonate;
pub mod driver;
pub mod ecosystem;
pub mod forcing;
pub mod light;
pub mod parameters;
pub mod solar;
pub mod state;
