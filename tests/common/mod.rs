#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use materials_tools::io::retrieval::{Retriever, SearchFilter};
use materials_tools::model::RawDocument;
use materials_tools::{Result, ToolError};
use serde_json::Value;

/// In-memory retriever returning canned documents and recording its calls.
#[derive(Default)]
pub struct StubRetriever {
    documents: Vec<RawDocument>,
    failure: Option<String>,
    calls: Cell<usize>,
    last_filter: RefCell<Option<SearchFilter>>,
    last_fields: RefCell<Vec<String>>,
}

impl StubRetriever {
    pub fn with_json(documents: &[Value]) -> Self {
        Self::with_documents(documents.iter().map(RawDocument::from_json).collect())
    }

    pub fn with_documents(documents: Vec<RawDocument>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_filter(&self) -> Option<SearchFilter> {
        self.last_filter.borrow().clone()
    }

    pub fn last_fields(&self) -> Vec<String> {
        self.last_fields.borrow().clone()
    }
}

impl Retriever for StubRetriever {
    fn fetch(&self, filter: &SearchFilter, fields: &[&str]) -> Result<Vec<RawDocument>> {
        self.calls.set(self.calls.get() + 1);
        *self.last_filter.borrow_mut() = Some(filter.clone());
        *self.last_fields.borrow_mut() = fields.iter().map(|field| field.to_string()).collect();

        match &self.failure {
            Some(message) => Err(ToolError::Retrieval(message.clone())),
            None => Ok(self.documents.clone()),
        }
    }
}

pub fn silicon() -> Value {
    serde_json::json!({
        "material_id": "mp-149",
        "formula_pretty": "Si",
        "band_gap": 1.14,
        "is_metal": false
    })
}

pub fn iron() -> Value {
    serde_json::json!({
        "material_id": "mp-13",
        "formula_pretty": "Fe",
        "band_gap": 0.0,
        "is_metal": true
    })
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
