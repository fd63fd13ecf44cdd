//! FFI interface for C and C++ callers
//!
//! Documents go in as UTF-8 bytes, configuration and results are passed as
//! JSON strings.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::config::ParserConfig;
use crate::parser::Parser;

/// Result struct returned to C
/// Both pointers are owned by Rust and must be freed via free_extraction_result
#[repr(C)]
pub struct ExtractionResultFFI {
    /// JSON export of the item object model (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Extract all configured formats from an HTML document.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `uri` - Document URI used to resolve relative URLs (null-terminated)
/// * `config_json` - JSON-serialized ParserConfig (null-terminated), or null for defaults
///
/// # Returns
/// ExtractionResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `uri` and a non-null `config_json` must be valid null-terminated C strings
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn extract_items_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    uri: *const c_char,
    config_json: *const c_char,
) -> ExtractionResultFFI {
    let html = if html_ptr.is_null() || html_len == 0 {
        ""
    } else {
        let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
        match std::str::from_utf8(slice) {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in HTML content"),
        }
    };

    if uri.is_null() {
        return make_error_result("URI is null");
    }
    let uri = match CStr::from_ptr(uri).to_str() {
        Ok(s) => s,
        Err(_) => return make_error_result("Invalid UTF-8 in URI"),
    };

    let config = if config_json.is_null() {
        ParserConfig::default()
    } else {
        let config_str = match CStr::from_ptr(config_json).to_str() {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in config JSON"),
        };
        match serde_json::from_str::<ParserConfig>(config_str) {
            Ok(config) => config,
            Err(e) => return make_error_result(&format!("Failed to parse config JSON: {}", e)),
        }
    };

    let mut parser = Parser::new(config);
    let model = match parser.extract_configured(uri, Some(html)) {
        Ok(model) => model,
        Err(e) => return make_error_result(&e.to_string()),
    };

    match serde_json::to_string(&model.export()) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ExtractionResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

/// Free an ExtractionResultFFI returned by extract_items_ffi
///
/// # Safety
/// - `result` must have been returned by `extract_items_ffi`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_extraction_result(result: ExtractionResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

fn make_error_result(msg: &str) -> ExtractionResultFFI {
    let error_cstr = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    ExtractionResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}
