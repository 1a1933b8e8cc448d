#![cfg(target_arch = "wasm32")]

use crate::engine::{command_catalog, CommandInfo, CommandOutcome, Engine, SimParams};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn available_commands() -> js_sys::Array {
    let out = js_sys::Array::new();
    for info in command_catalog() {
        out.push(&command_info_to_js(info));
    }
    out
}

#[wasm_bindgen]
pub fn sim_defaults() -> JsValue {
    let params = SimParams::default();
    serde_wasm_bindgen::to_value(&params).unwrap_or(JsValue::NULL)
}

fn command_info_to_js(info: &CommandInfo) -> JsValue {
    let obj = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&obj, &JsValue::from_str("id"), &JsValue::from_str(info.id));
    let _ = js_sys::Reflect::set(&obj, &JsValue::from_str("label"), &JsValue::from_str(info.label));
    let _ = js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("menuIndex"),
        &JsValue::from_f64(info.menu_index as f64),
    );
    JsValue::from(obj)
}

fn outcome_to_js(outcome: CommandOutcome) -> JsValue {
    match outcome {
        CommandOutcome::Respawned => JsValue::from_str("respawned"),
        CommandOutcome::Quit => JsValue::from_str("quit"),
    }
}

#[wasm_bindgen]
pub struct WasmSim {
    engine: Engine,
}

#[wasm_bindgen]
impl WasmSim {
    /// `params` is a partial `SimParams` object; missing fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(params: JsValue) -> Result<WasmSim, JsValue> {
        let params: SimParams = if params.is_undefined() || params.is_null() {
            SimParams::default()
        } else {
            serde_wasm_bindgen::from_value(params)
                .map_err(|e| JsValue::from_str(&format!("invalid params: {}", e)))?
        };
        Ok(WasmSim { engine: Engine::new(params) })
    }

    pub fn len(&self) -> usize { self.engine.len() }

    pub fn tick(&mut self) { self.engine.tick(); }

    pub fn respawn(&mut self) { self.engine.respawn(); }

    /// Homogeneous positions, 4 floats per particle.
    pub fn positions(&self) -> Vec<f32> { self.engine.positions_flat() }

    /// RGBA colours, 4 floats per particle.
    pub fn colors(&self) -> Vec<f32> { self.engine.colors_flat() }

    pub fn states(&self) -> Vec<f32> { self.engine.state_matrix_flat() }

    pub fn point_size(&self) -> f64 { self.engine.point_size() }

    pub fn params(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.engine.params()).unwrap_or(JsValue::NULL)
    }

    pub fn set_params(&mut self, params: JsValue) -> Result<(), JsValue> {
        let params: SimParams = serde_wasm_bindgen::from_value(params)
            .map_err(|e| JsValue::from_str(&format!("invalid params: {}", e)))?;
        self.engine.set_params(params);
        Ok(())
    }

    pub fn apply_command(&mut self, command_id: &str) -> Result<JsValue, JsValue> {
        self.engine
            .apply_command(command_id)
            .map(outcome_to_js)
            .map_err(|e| JsValue::from_str(&e))
    }

    pub fn apply_menu_index(&mut self, menu_index: u32) -> Result<JsValue, JsValue> {
        self.engine
            .apply_menu_index(menu_index)
            .map(outcome_to_js)
            .map_err(|e| JsValue::from_str(&e))
    }
}
