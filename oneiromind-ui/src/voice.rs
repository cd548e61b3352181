//! Browser Speech Recognition
//!
//! Wraps the Web Speech API (`SpeechRecognition`, or the prefixed
//! `webkitSpeechRecognition`). The API is not in the stable `web-sys`
//! bindings, so the recognizer is driven through `js_sys::Reflect`.

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use oneiromind::voice::{SpeechCapability, SpeechError, SpeechEvent, SpeechResult, RECOGNITION_LANG};

const CONSTRUCTORS: [&str; 2] = ["SpeechRecognition", "webkitSpeechRecognition"];

/// Platform speech recognizer, or nothing if the browser has none
pub struct BrowserSpeech {
    recognition: Option<JsValue>,
}

fn constructor(window: &web_sys::Window) -> Option<Function> {
    CONSTRUCTORS.iter().find_map(|name| {
        Reflect::get(window, &JsValue::from_str(name))
            .ok()
            .filter(|ctor| ctor.is_function())
            .map(|ctor| ctor.unchecked_into::<Function>())
    })
}

fn set(target: &JsValue, key: &str, value: &JsValue) {
    if let Err(e) = Reflect::set(target, &JsValue::from_str(key), value) {
        web_sys::console::warn_1(&format!("Speech recognition: cannot set {}: {:?}", key, e).into());
    }
}

/// Top transcript of every result in a `result` event
fn transcripts(event: &JsValue) -> Vec<String> {
    let Ok(results) = Reflect::get(event, &JsValue::from_str("results")) else {
        return Vec::new();
    };
    let length = Reflect::get(&results, &JsValue::from_str("length"))
        .ok()
        .and_then(|l| l.as_f64())
        .unwrap_or(0.0) as u32;

    (0..length)
        .filter_map(|i| {
            let result = Reflect::get_u32(&results, i).ok()?;
            let best = Reflect::get_u32(&result, 0).ok()?;
            Reflect::get(&best, &JsValue::from_str("transcript"))
                .ok()?
                .as_string()
        })
        .collect()
}

fn error_code(event: &JsValue) -> String {
    Reflect::get(event, &JsValue::from_str("error"))
        .ok()
        .and_then(|e| e.as_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl BrowserSpeech {
    /// Probe for a recognizer and configure it
    pub fn new() -> Self {
        let recognition = web_sys::window()
            .as_ref()
            .and_then(constructor)
            .and_then(|ctor| Reflect::construct(&ctor, &Array::new()).ok());

        match &recognition {
            Some(rec) => {
                set(rec, "lang", &JsValue::from_str(RECOGNITION_LANG));
                set(rec, "continuous", &JsValue::TRUE);
                set(rec, "interimResults", &JsValue::TRUE);
            }
            None => {
                web_sys::console::log_1(&"Speech recognition not supported in this browser".into());
            }
        }

        Self { recognition }
    }

    /// Deliver recognizer events to `handler`
    pub fn on_event(&self, handler: impl Fn(SpeechEvent) + 'static) {
        let Some(rec) = &self.recognition else {
            return;
        };
        let handler = std::rc::Rc::new(handler);

        let h = handler.clone();
        let on_start = Closure::wrap(Box::new(move |_: JsValue| {
            h(SpeechEvent::Started);
        }) as Box<dyn FnMut(JsValue)>);
        set(rec, "onstart", on_start.as_ref());
        on_start.forget();

        let h = handler.clone();
        let on_result = Closure::wrap(Box::new(move |event: JsValue| {
            h(SpeechEvent::Results(transcripts(&event)));
        }) as Box<dyn FnMut(JsValue)>);
        set(rec, "onresult", on_result.as_ref());
        on_result.forget();

        let h = handler.clone();
        let on_end = Closure::wrap(Box::new(move |_: JsValue| {
            h(SpeechEvent::Ended);
        }) as Box<dyn FnMut(JsValue)>);
        set(rec, "onend", on_end.as_ref());
        on_end.forget();

        let h = handler;
        let on_error = Closure::wrap(Box::new(move |event: JsValue| {
            let code = error_code(&event);
            web_sys::console::error_1(&format!("Speech recognition error: {}", code).into());
            h(SpeechEvent::Error(code));
        }) as Box<dyn FnMut(JsValue)>);
        set(rec, "onerror", on_error.as_ref());
        on_error.forget();
    }

    fn call(&self, method: &str) -> Result<(), JsValue> {
        let rec = self
            .recognition
            .as_ref()
            .ok_or_else(|| JsValue::from_str("unsupported"))?;
        let function: Function = Reflect::get(rec, &JsValue::from_str(method))?.dyn_into()?;
        function.call0(rec).map(|_| ())
    }
}

impl Default for BrowserSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechCapability for BrowserSpeech {
    fn is_supported(&self) -> bool {
        self.recognition.is_some()
    }

    fn start(&self) -> SpeechResult<()> {
        if self.recognition.is_none() {
            return Err(SpeechError::Unsupported);
        }
        self.call("start")
            .map_err(|e| SpeechError::Start(format!("{:?}", e)))
    }

    fn stop(&self) {
        if let Err(e) = self.call("stop") {
            web_sys::console::warn_1(&format!("Speech recognition stop failed: {:?}", e).into());
        }
    }
}
