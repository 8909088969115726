#![cfg(target_arch = "wasm32")]

//! Browser bindings: HTTP catalog and ranking access, `localStorage`
//! preferences, and a `WebQuiz` handle for the presentation layer.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_net::http::Request;
use js_sys::{Function, Promise, Reflect};
use log::warn;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::catalog::{self, Catalog, CatalogError};
use crate::config::{Category, QuestionCount, QuizConfig};
use crate::language::{self, Language, PreferenceError, PreferenceStore};
use crate::piece::Piece;
use crate::quiz::QuizFormat;
use crate::ranking::{
    RANKING_PATH, Rank, RankingError, RankingQuery, RankingResponse, RankingType,
    ScoreSubmission, SubmitResponse,
};
use crate::session::{Clock, QuizEngine};

/// `Date.now()` as the quiz clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

/// Preferences backed by `window.localStorage`, reached through `Reflect`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn local_storage() -> Option<JsValue> {
    let storage = Reflect::get(&js_sys::global(), &JsValue::from_str("localStorage")).ok()?;

    if storage.is_undefined() || storage.is_null() {
        None
    } else {
        Some(storage)
    }
}

fn storage_method(storage: &JsValue, name: &str) -> Result<Function, JsValue> {
    Reflect::get(storage, &JsValue::from_str(name))?.dyn_into::<Function>()
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        let storage = local_storage()?;
        storage_method(&storage, "getItem")
            .and_then(|get_item| get_item.call1(&storage, &JsValue::from_str(key)))
            .ok()?
            .as_string()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let storage = local_storage()
            .ok_or_else(|| PreferenceError::Unavailable("localStorage".to_string()))?;

        storage_method(&storage, "setItem")
            .and_then(|set_item| {
                set_item.call2(&storage, &JsValue::from_str(key), &JsValue::from_str(value))
            })
            .map(|_| ())
            .map_err(|error| PreferenceError::Unavailable(format!("{:?}", error)))
    }
}

/// Fetches `/music.{code}.json` from the page origin.
pub async fn fetch_pieces(language: Language) -> Result<Vec<Piece>, CatalogError> {
    let url = format!("/{}", catalog::catalog_file_name(language));

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|error| CatalogError::Transport {
            message: error.to_string(),
        })?;

    if !response.ok() {
        return Err(CatalogError::Http {
            language,
            status: response.status(),
        });
    }

    response
        .json::<Vec<Piece>>()
        .await
        .map_err(|error| CatalogError::Parse {
            message: error.to_string(),
        })
}

fn transport_error(error: gloo_net::Error) -> RankingError {
    RankingError::Transport {
        message: error.to_string(),
    }
}

pub async fn fetch_ranking(query: &RankingQuery) -> Result<Vec<Rank>, RankingError> {
    let response = Request::get(&query.path())
        .send()
        .await
        .map_err(transport_error)?;

    if !response.ok() {
        return Err(RankingError::Status {
            status: response.status(),
        });
    }

    response
        .json::<RankingResponse>()
        .await
        .map(|body| body.ranking)
        .map_err(|error| RankingError::Parse {
            message: error.to_string(),
        })
}

pub async fn submit_score(submission: &ScoreSubmission) -> Result<Rank, RankingError> {
    let response = Request::post(RANKING_PATH)
        .json(submission)
        .map_err(transport_error)?
        .send()
        .await
        .map_err(transport_error)?;

    if !response.ok() {
        return Err(RankingError::Status {
            status: response.status(),
        });
    }

    response
        .json::<SubmitResponse>()
        .await
        .map(|body| body.data)
        .map_err(|error| RankingError::Parse {
            message: error.to_string(),
        })
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

struct WebState {
    catalog: Catalog,
    engine: QuizEngine<StdRng, JsClock>,
    prefs: LocalStorage,
}

async fn reload(state: Rc<RefCell<WebState>>, force: bool) {
    let ticket = {
        let mut state = state.borrow_mut();
        if !state.catalog.needs_fetch(force) {
            return;
        }
        state.catalog.begin_fetch()
    };

    let result = fetch_pieces(ticket.language).await;
    state.borrow_mut().catalog.finish_fetch(ticket, result);
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_json::to_string(value)
        .map(|json| JsValue::from_str(&json))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Quiz state shared with the page scripts.
#[wasm_bindgen]
pub struct WebQuiz {
    state: Rc<RefCell<WebState>>,
}

#[wasm_bindgen]
impl WebQuiz {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebQuiz {
        let prefs = LocalStorage;
        let catalog = Catalog::new(language::load_language(&prefs));

        WebQuiz {
            state: Rc::new(RefCell::new(WebState {
                catalog,
                engine: QuizEngine::from_entropy(JsClock),
                prefs,
            })),
        }
    }

    /// Loads the catalog for the current language; resolves once applied.
    pub fn load(&self, force: bool) -> Promise {
        let state = Rc::clone(&self.state);
        future_to_promise(async move {
            reload(state, force).await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Switches language, drops the current quiz and reloads the catalog.
    #[wasm_bindgen(js_name = setLanguage)]
    pub fn set_language(&self, code: &str) -> Result<Promise, JsValue> {
        let language: Language = code
            .parse()
            .map_err(|error: language::ParseLanguageError| JsValue::from_str(&error.to_string()))?;

        let changed = {
            let mut state = self.state.borrow_mut();
            let WebState {
                catalog,
                engine,
                prefs,
            } = &mut *state;

            let changed = catalog.switch_language(language);
            if changed {
                if let Err(error) = language::save_language(prefs, language) {
                    warn!("could not persist language preference: {}", error);
                }
                engine.reset();
            }
            changed
        };

        let state = Rc::clone(&self.state);
        Ok(future_to_promise(async move {
            if changed {
                reload(state, true).await;
            }
            Ok(JsValue::from_bool(changed))
        }))
    }

    pub fn language(&self) -> String {
        self.state.borrow().catalog.language().code().to_string()
    }

    #[wasm_bindgen(js_name = catalogError)]
    pub fn catalog_error(&self) -> Option<String> {
        self.state
            .borrow()
            .catalog
            .error()
            .map(|error| error.to_string())
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().catalog.is_loading()
    }

    /// Validates the setup form and generates questions.
    ///
    /// Returns the number of questions, or the validation message.
    #[wasm_bindgen(js_name = setupQuiz)]
    pub fn setup_quiz(
        &self,
        nickname: &str,
        format: &str,
        category: &str,
        requested: u32,
    ) -> Result<usize, JsValue> {
        let format: QuizFormat = format
            .parse()
            .map_err(|error: crate::quiz::ParseFormatError| JsValue::from_str(&error.to_string()))?;
        let category = Category::from(category.to_string());
        let count = QuestionCount::from_requested(requested as usize);
        let config = QuizConfig::new(nickname, format, category, count)
            .map_err(|error| JsValue::from_str(&error.to_string()))?;

        let mut state = self.state.borrow_mut();
        let WebState {
            catalog, engine, ..
        } = &mut *state;
        engine.setup_quiz(catalog, config);

        Ok(engine.session().questions.len())
    }

    #[wasm_bindgen(js_name = startQuiz)]
    pub fn start_quiz(&self) -> bool {
        self.state.borrow_mut().engine.start_quiz()
    }

    /// Returns whether the answer was correct, or `undefined` if ignored.
    #[wasm_bindgen(js_name = answerQuestion)]
    pub fn answer_question(&self, selected_id: &str) -> Option<bool> {
        self.state
            .borrow_mut()
            .engine
            .answer_question(selected_id)
            .map(|record| record.is_correct)
    }

    #[wasm_bindgen(js_name = currentQuestion)]
    pub fn current_question(&self) -> Result<JsValue, JsValue> {
        match self.state.borrow().engine.current_question() {
            Some(question) => to_json(question),
            None => Ok(JsValue::NULL),
        }
    }

    /// The full session as a JSON string.
    pub fn session(&self) -> Result<JsValue, JsValue> {
        to_json(self.state.borrow().engine.session())
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.state.borrow().engine.is_complete()
    }

    #[wasm_bindgen(js_name = totalTime)]
    pub fn total_time(&self) -> f64 {
        self.state.borrow().engine.total_time()
    }

    #[wasm_bindgen(js_name = finalScore)]
    pub fn final_score(&self) -> f64 {
        self.state.borrow().engine.final_score() as f64
    }

    /// Posts the finished score; resolves to the rank entry as JSON.
    #[wasm_bindgen(js_name = submitScore)]
    pub fn submit_score(&self) -> Promise {
        let submission = self.state.borrow().engine.score_submission();

        future_to_promise(async move {
            let submission = submission.ok_or_else(|| js_error(RankingError::IncompleteQuiz))?;
            let rank = submit_score(&submission).await.map_err(js_error)?;
            to_json(&rank)
        })
    }

    /// Resolves to the ranking list as JSON.
    #[wasm_bindgen(js_name = fetchRanking)]
    pub fn fetch_ranking(&self, region: &str, kind: &str, format: &str) -> Result<Promise, JsValue> {
        let query = RankingQuery {
            region: Category::from(region.to_string()),
            kind: kind.parse::<RankingType>().map_err(js_error)?,
            format: format
                .parse()
                .map_err(|error: crate::quiz::ParseFormatError| JsValue::from_str(&error.to_string()))?,
        };

        Ok(future_to_promise(async move {
            let ranking = fetch_ranking(&query).await.map_err(js_error)?;
            to_json(&ranking)
        }))
    }
}

impl Default for WebQuiz {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}
