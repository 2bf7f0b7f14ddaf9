//! Browser bridge for the panel solver. Arguments arrive as JS values, results leave as
//! serialized structs or typed arrays ready for plotting.

use anyhow::{Context, Result};
use foil_core::geometry::generate_boundary;
use foil_core::solution::PanelModel;
use foil_core::traits::AirfoilShape;
use foil_core::{Naca4, SolverSettings};
use js_sys::Float64Array;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub mod polar;

pub(crate) fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

/// `undefined` and `null` select the default settings.
pub(crate) fn parse_settings(settings: JsValue) -> Result<SolverSettings, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        return Ok(SolverSettings::default());
    }
    from_value(settings).map_err(|e| js_error("Invalid settings", e))
}

pub(crate) fn build_model(
    designation: &str,
    panels: u32,
    settings: &SolverSettings,
) -> Result<PanelModel> {
    let foil: Naca4 = designation
        .parse()
        .with_context(|| format!("Unrecognized airfoil \"{}\"", designation))?;
    PanelModel::from_shape(&foil, panels as usize, settings)
        .with_context(|| format!("Failed to panel {} with {} panels", foil, panels))
}

/// Solves one angle of attack and returns the serialized `Solution`.
#[wasm_bindgen]
pub fn analyze_naca(
    designation: &str,
    panels: u32,
    alpha_deg: f64,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let settings = parse_settings(settings)?;
    let model = build_model(designation, panels, &settings)
        .map_err(|e| js_error("Analysis failed", format!("{:#}", e)))?;
    let solution = model
        .solve(alpha_deg, &settings)
        .map_err(|e| js_error("Analysis failed", e))?;

    to_value(&solution).map_err(|e| js_error("Serialization error", e))
}

/// Uniformly sampled upper/lower surfaces and camber line.
#[wasm_bindgen]
pub fn naca_profile(designation: &str, samples: u32) -> Result<JsValue, JsValue> {
    let foil: Naca4 = designation
        .parse()
        .map_err(|e| js_error("Profile failed", e))?;
    let profile = foil
        .profile(samples as usize)
        .map_err(|e| js_error("Profile failed", e))?;
    to_value(&profile).map_err(|e| js_error("Serialization error", e))
}

/// Boundary points interleaved as `[x0, y0, x1, y1, ...]`.
#[wasm_bindgen]
pub fn naca_boundary(
    designation: &str,
    panels: u32,
    settings: JsValue,
) -> Result<Float64Array, JsValue> {
    let settings = parse_settings(settings)?;
    let foil: Naca4 = designation
        .parse()
        .map_err(|e| js_error("Boundary failed", e))?;
    let boundary = generate_boundary(&foil, panels as usize, &settings.paneling)
        .map_err(|e| js_error("Boundary failed", e))?;

    let flat: Vec<f64> = boundary.points().iter().flat_map(|p| [p.x, p.y]).collect();
    Ok(Float64Array::from(flat.as_slice()))
}
