use hdk::prelude::*;
use orders_integrity::*;

// Properties of the running DNA, falling back to the defaults when the
// manifest carries none
pub fn orders_properties() -> ExternResult<OrdersProperties> {
    let properties_sb = dna_info()?.modifiers.properties;
    let properties = match OrdersProperties::decode(properties_sb.bytes()) {
        Some(properties) => properties,
        None => {
            debug!("[orders_properties] No readable DNA properties, using defaults");
            OrdersProperties::default()
        }
    };
    properties
        .check()
        .map_err(|e| wasm_error!(WasmErrorInner::Guest(e)))
}

pub fn is_admin() -> ExternResult<bool> {
    let caller_pub_key = agent_info()?.agent_initial_pubkey;
    let properties = orders_properties()?;

    let is_match = properties.is_admin(&caller_pub_key);
    debug!("[is_admin] Caller {} is admin: {}", caller_pub_key, is_match);
    Ok(is_match)
}
