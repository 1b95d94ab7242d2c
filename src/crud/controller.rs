//! Generic CRUD controller
//!
//! One controller instance serves one registered model. It never knows the
//! concrete entity: documents are JSON objects shaped by a [`ModelSchema`],
//! and entity-specific behaviour lives in [`ModelHooks`].

use crate::core::document::{
    CREATED_KEY, Document, DocumentId, ENABLED_KEY, REMOVED_KEY, UPDATED_KEY, id_of,
    is_removed, now_timestamp,
};
use crate::core::error::CrudError;
use crate::core::query::{
    Condition, Filter, FindOptions, ListParams, Pagination, RawQuery, SortDirection, SortSpec,
    field_param, param, split_fields,
};
use crate::core::response::ApiResponse;
use crate::core::schema::ModelSchema;
use crate::core::store::DocumentStore;
use crate::crud::hooks::{ModelHooks, NoHooks};
use axum::http::StatusCode;
use futures::future::try_join_all;
use serde_json::{Value, json};
use std::sync::Arc;

const EMPTY_COLLECTION: &str = "Collection is Empty";
const FOUND_ALL: &str = "Successfully found all documents";
const NOTHING_MATCHED: &str = "No document found by this request";

/// Tunables shared by every controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Page size when the client does not ask for one
    pub default_items: usize,

    /// Maximum number of search results
    pub search_limit: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_items: 10,
            search_limit: 20,
        }
    }
}

/// CRUD operations of one model
#[derive(Clone)]
pub struct CrudController {
    store: Arc<dyn DocumentStore>,
    schema: Arc<ModelSchema>,
    hooks: Arc<dyn ModelHooks>,
    settings: ControllerSettings,
}

impl CrudController {
    pub fn new(store: Arc<dyn DocumentStore>, schema: ModelSchema) -> Self {
        Self {
            store,
            schema: Arc::new(schema),
            hooks: Arc::new(NoHooks),
            settings: ControllerSettings::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: impl ModelHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    fn collection(&self) -> &str {
        &self.schema.collection
    }

    fn not_found(&self, id: &DocumentId) -> CrudError {
        CrudError::NotFound {
            entity: self.schema.entity.clone(),
            id: id.to_string(),
        }
    }

    /// Replace reference ids by the referenced documents
    ///
    /// A dangling reference becomes `null`.
    async fn populate(&self, mut doc: Document) -> Result<Document, CrudError> {
        for reference in self.schema.references() {
            let Some(raw) = doc.get(&reference.field).and_then(Value::as_str) else {
                continue;
            };
            let target = match DocumentId::parse(raw) {
                Ok(id) => {
                    self.store
                        .find_one(&reference.collection, &Filter::by_id(id))
                        .await?
                }
                Err(_) => None,
            };
            doc.insert(
                reference.field.clone(),
                target.map(Value::Object).unwrap_or(Value::Null),
            );
        }
        Ok(doc)
    }

    async fn populate_all(&self, docs: Vec<Document>) -> Result<Value, CrudError> {
        let docs = try_join_all(docs.into_iter().map(|doc| self.populate(doc))).await?;
        Ok(Value::Array(docs.into_iter().map(Value::Object).collect()))
    }

    // === Single-document operations ===

    pub async fn create(&self, body: Value) -> Result<ApiResponse, CrudError> {
        let mut doc = self.schema.prepare_create(body)?;
        self.hooks.before_create(&mut doc).await?;

        let doc = match self.store.insert(self.collection(), doc.clone()).await {
            Ok(doc) => doc,
            Err(e) => {
                self.hooks.abort_create(&doc).await?;
                return Err(e.into());
            }
        };
        let doc = self.hooks.after_create(doc).await?;

        tracing::info!(
            entity = %self.schema.entity,
            id = id_of(&doc).unwrap_or_default(),
            "document created"
        );
        Ok(ApiResponse::ok(
            Value::Object(doc),
            "Successfully Created the document in Model ",
        ))
    }

    pub async fn read(&self, id: &str) -> Result<ApiResponse, CrudError> {
        let id = DocumentId::parse(id)?;
        let doc = self
            .store
            .find_one(self.collection(), &Filter::active_by_id(id))
            .await?
            .ok_or_else(|| self.not_found(&id))?;

        let doc = self.populate(doc).await?;
        Ok(ApiResponse::ok(Value::Object(doc), "we found this document "))
    }

    pub async fn update(&self, id: &str, body: Value) -> Result<ApiResponse, CrudError> {
        let id = DocumentId::parse(id)?;
        let mut patch = self.schema.prepare_update(body)?;

        let filter = Filter::active_by_id(id);
        let existing = self
            .store
            .find_one(self.collection(), &filter)
            .await?
            .ok_or_else(|| self.not_found(&id))?;

        self.hooks.before_update(&existing, &mut patch).await?;

        let updated = match self
            .store
            .find_one_and_update(self.collection(), &filter, patch.clone())
            .await
        {
            Ok(Some(updated)) => updated,
            outcome => {
                // Removed meanwhile, or the write failed
                self.hooks.abort_update(&existing, &patch).await?;
                return Err(match outcome {
                    Err(e) => e.into(),
                    _ => self.not_found(&id),
                });
            }
        };
        self.hooks.after_update(&existing, &updated).await?;

        tracing::info!(entity = %self.schema.entity, id = %id, "document updated");
        Ok(ApiResponse::ok(Value::Object(updated), "we update this document "))
    }

    /// Soft delete: the document is flagged `removed`, never erased
    ///
    /// Removing an already removed document succeeds again without running
    /// the removal hooks a second time.
    pub async fn remove(&self, id: &str) -> Result<ApiResponse, CrudError> {
        let id = DocumentId::parse(id)?;
        let filter = Filter::by_id(id);

        let previous = self
            .store
            .find_one(self.collection(), &filter)
            .await?
            .ok_or_else(|| self.not_found(&id))?;

        let mut patch = Document::new();
        patch.insert(REMOVED_KEY.to_string(), Value::Bool(true));
        patch.insert(UPDATED_KEY.to_string(), Value::String(now_timestamp()));

        let removed = self
            .store
            .find_one_and_update(self.collection(), &filter, patch)
            .await?
            .ok_or_else(|| self.not_found(&id))?;

        if !is_removed(&previous) {
            self.hooks.after_remove(&removed).await?;
        }

        tracing::info!(entity = %self.schema.entity, id = %id, "document removed");
        Ok(ApiResponse::ok(
            Value::Object(removed),
            "Successfully Deleted the document ",
        ))
    }

    // === Collection operations ===

    /// One page of live documents with pagination metadata
    pub async fn paginated_list(&self, raw: &RawQuery) -> Result<ApiResponse, CrudError> {
        let params = ListParams::from_query(raw, self.settings.default_items);
        let options = params.find_options();

        let count = self.store.count(self.collection(), &options.filter).await? as usize;
        let pagination = Pagination::new(params.page, params.items, count);

        if count == 0 {
            return Ok(ApiResponse::new(
                StatusCode::NON_AUTHORITATIVE_INFORMATION,
                true,
                json!([]),
                EMPTY_COLLECTION,
            )
            .with_pagination(pagination));
        }

        let docs = self.store.find(self.collection(), &options).await?;
        tracing::debug!(
            entity = %self.schema.entity,
            page = params.page,
            count,
            returned = docs.len(),
            "page listed"
        );

        let result = self.populate_all(docs).await?;
        Ok(ApiResponse::ok(result, FOUND_ALL).with_pagination(pagination))
    }

    /// Every live document, ordered by creation time
    pub async fn list_all(&self, raw: &RawQuery) -> Result<ApiResponse, CrudError> {
        let direction = match param(raw, "sort") {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortDirection::Ascending,
            _ => SortDirection::Descending,
        };

        let mut filter = Filter::active();
        if let Some(enabled) = param(raw, ENABLED_KEY) {
            filter = filter.and(Condition::equals(ENABLED_KEY, enabled));
        }

        let options =
            FindOptions::new(filter).sort(Some(SortSpec::new(CREATED_KEY, direction)));
        let docs = self.store.find(self.collection(), &options).await?;

        if docs.is_empty() {
            return Ok(ApiResponse::new(
                StatusCode::NON_AUTHORITATIVE_INFORMATION,
                false,
                json!([]),
                EMPTY_COLLECTION,
            ));
        }

        let result = self.populate_all(docs).await?;
        Ok(ApiResponse::ok(result, FOUND_ALL))
    }

    /// Case-insensitive substring search over `fields` (or the model's defaults)
    pub async fn search(&self, raw: &RawQuery) -> Result<ApiResponse, CrudError> {
        let nothing = || {
            ApiResponse::new(StatusCode::ACCEPTED, false, json!([]), NOTHING_MATCHED)
        };

        let Some(q) = param(raw, "q") else {
            return Ok(nothing());
        };

        let fields = param(raw, "fields")
            .map(split_fields)
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| self.schema.default_search_fields().to_vec());

        let options = FindOptions::new(Filter::active().and(Condition::contains(fields, q)))
            .limit(self.settings.search_limit);
        let docs = self.store.find(self.collection(), &options).await?;

        if docs.is_empty() {
            return Ok(nothing());
        }

        let result = self.populate_all(docs).await?;
        Ok(ApiResponse::ok(result, FOUND_ALL))
    }

    /// Live documents whose `filter` field equals `equal`
    pub async fn filter(&self, raw: &RawQuery) -> Result<ApiResponse, CrudError> {
        let (Some(field), Some(value)) = (field_param(raw, "filter"), param(raw, "equal")) else {
            return Err(CrudError::FilterNotProvided);
        };

        let filter = Filter::active().and(Condition::equals(field, value));
        let docs = self
            .store
            .find(self.collection(), &FindOptions::new(filter))
            .await?;

        let result = self.populate_all(docs).await?;
        Ok(ApiResponse::ok(result, FOUND_ALL))
    }

    /// Count of live documents, optionally narrowed by `filter` + `equal`
    pub async fn summary(&self, raw: &RawQuery) -> Result<ApiResponse, CrudError> {
        let all = Filter::active();
        let count_all = self.store.count(self.collection(), &all).await?;

        if count_all == 0 {
            return Ok(ApiResponse::new(
                StatusCode::NON_AUTHORITATIVE_INFORMATION,
                false,
                json!([]),
                EMPTY_COLLECTION,
            ));
        }

        let count_filter = match (field_param(raw, "filter"), param(raw, "equal")) {
            (Some(field), Some(value)) => {
                self.store
                    .count(self.collection(), &all.and(Condition::equals(field, value)))
                    .await?
            }
            _ => count_all,
        };

        Ok(ApiResponse::ok(
            json!({
                "countFilter": count_filter,
                "countAllDocs": count_all,
            }),
            "Successfully count all documents",
        ))
    }
}

impl std::fmt::Debug for CrudController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudController")
            .field("entity", &self.schema.entity)
            .field("collection", &self.schema.collection)
            .field("settings", &self.settings)
            .finish()
    }
}
