//! Stepped polar sweep, so long angle lists do not block the UI thread.

use crate::{build_model, js_error, parse_settings};
use foil_core::solution::{PanelModel, Polar};
use foil_core::solvers::DenseLu;
use foil_core::MomentReference;
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

/// Progress payload for the stepped polar runner.
#[derive(Serialize)]
struct PolarProgress {
    done: bool,
    completed: usize,
    total: usize,
}

struct PolarRunnerState {
    model: PanelModel,
    reference: MomentReference,
    alphas: Vec<f64>,
    polar: Polar,
}

impl PolarRunnerState {
    fn done(&self) -> bool {
        self.polar.points.len() >= self.alphas.len()
    }

    fn progress(&self) -> PolarProgress {
        PolarProgress {
            done: self.done(),
            completed: self.polar.points.len(),
            total: self.alphas.len(),
        }
    }
}

#[wasm_bindgen]
pub struct WasmPolarRunner {
    state: Option<PolarRunnerState>,
}

#[wasm_bindgen]
impl WasmPolarRunner {
    /// Panels the section and assembles its influence system once; every batch reuses it.
    #[wasm_bindgen(constructor)]
    pub fn new(
        designation: &str,
        panels: u32,
        alphas: Vec<f64>,
        settings: JsValue,
    ) -> Result<WasmPolarRunner, JsValue> {
        console_error_panic_hook::set_once();

        if let Some(bad) = alphas.iter().find(|a| !a.is_finite()) {
            return Err(JsValue::from_str(&format!(
                "Angle of attack must be finite, got {}",
                bad
            )));
        }
        let settings = parse_settings(settings)?;
        let model = build_model(designation, panels, &settings)
            .map_err(|e| js_error("Polar sweep failed", format!("{:#}", e)))?;

        Ok(WasmPolarRunner {
            state: Some(PolarRunnerState {
                model,
                reference: settings.moment_reference,
                polar: Polar {
                    points: Vec::with_capacity(alphas.len()),
                },
                alphas,
            }),
        })
    }

    pub fn is_done(&self) -> bool {
        self.state.as_ref().map_or(true, |state| state.done())
    }

    /// Solves up to `batch_size` further angles against one factorization.
    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        if !state.done() {
            let start = state.polar.points.len();
            let end = (start + batch_size.max(1) as usize).min(state.alphas.len());
            let solutions = state
                .model
                .sweep_with(&DenseLu, &state.alphas[start..end], &state.reference)
                .map_err(|e| js_error("Polar sweep failed", e))?;
            state
                .polar
                .points
                .extend(solutions.into_iter().map(|s| s.coefficients));
        }

        to_value(&state.progress()).map_err(|e| js_error("Serialization error", e))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;
        to_value(&state.progress()).map_err(|e| js_error("Serialization error", e))
    }

    /// The polar computed so far, in the order the angles were given.
    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;
        to_value(&state.polar).map_err(|e| js_error("Serialization error", e))
    }
}
