use crate::config::HttpConfig;
use crate::dispatch::TaskDispatcher;
use crate::errors::{Result, UrlError};
use crate::preprocess::{PreChain, Preprocessor, SerialPreprocessor, TerminalAction};
use crate::registry::{Cancelable, TagRegistry};
use crate::task::HttpTask;
use log::debug;
use std::sync::Arc;
use std::time::Duration;


/// The client handle owning the preprocessor pipeline, the tag-task
/// registry, and the transport dispatcher. Cheap to clone; all clones share
/// state.
///
/// The pipeline is fixed at build time and read-only afterwards. Requests
/// flow through [`HttpClient::preprocess`], which runs every configured
/// preprocessor in order before handing control to the terminal action that
/// performs the actual call.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: Option<String>,
    preprocessors: Arc<[Arc<dyn Preprocessor>]>,
    tag_tasks: TagRegistry,
    dispatcher: TaskDispatcher,
    config: HttpConfig,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Runs the preprocessing pipeline for one request attempt.
    ///
    /// With an empty pipeline or `skip_preproc`, the terminal action runs
    /// immediately and inline; no chain is created. With
    /// `skip_serial_preproc`, any leading run of serial slots is bypassed
    /// entirely (not queued), and the chain keeps bypassing serial slots at
    /// every later advance.
    pub async fn preprocess(
        &self,
        task: Arc<HttpTask>,
        terminal: TerminalAction,
        skip_preproc: bool,
        skip_serial_preproc: bool,
    ) {
        let preprocessors = &self.inner.preprocessors;
        if preprocessors.is_empty() || skip_preproc {
            terminal().await;
            return;
        }
        let mut index = 0;
        if skip_serial_preproc {
            while index < preprocessors.len() && preprocessors[index].as_serial().is_some() {
                index += 1;
            }
        }
        if index < preprocessors.len() {
            debug!(
                "starting preprocessing: task_id={} first_step={} steps={}",
                task.id(),
                index,
                preprocessors.len()
            );
            let chain = PreChain::new(
                preprocessors.clone(),
                task,
                self.clone(),
                terminal,
                index + 1,
                skip_serial_preproc,
            );
            preprocessors[index].do_process(chain).await;
        } else {
            terminal().await;
        }
    }

    /// Like [`HttpClient::preprocess`], reading the skip flags off the task.
    pub async fn preprocess_task(&self, task: Arc<HttpTask>, terminal: TerminalAction) {
        let skip_preproc = task.is_skip_preproc();
        let skip_serial_preproc = task.is_skip_serial_preproc();
        self.preprocess(task, terminal, skip_preproc, skip_serial_preproc)
            .await
    }

    /// Registers an outstanding task under `tag` so it can be cancelled in
    /// bulk. The entry lives until [`HttpClient::remove_tag_task`] or expiry.
    pub fn add_tag_task(
        &self,
        tag: impl Into<String>,
        canceler: Arc<dyn Cancelable>,
        task: &HttpTask,
    ) {
        self.inner.tag_tasks.add(tag, canceler, task.id());
    }

    /// Drops the registry entry of a completed task.
    pub fn remove_tag_task(&self, task: &HttpTask) {
        self.inner.tag_tasks.remove(task.id());
    }

    /// Reassigns a task's tag, updating its live registry entry as well.
    pub fn set_task_tag(&self, task: &HttpTask, tag: &str) {
        task.set_tag(tag);
        self.inner.tag_tasks.retag(task.id(), tag);
    }

    /// Cancels every outstanding task whose tag contains `tag`; returns how
    /// many cancellations actually changed state.
    pub fn cancel(&self, tag: &str) -> usize {
        self.inner.tag_tasks.cancel(tag)
    }

    /// Cancels everything: aborts all work the transport dispatcher is
    /// tracking (registry-tracked or not) and empties the registry.
    pub fn cancel_all(&self) {
        self.inner.dispatcher.cancel_all();
        self.inner.tag_tasks.clear();
    }

    pub fn tag_task_count(&self) -> usize {
        self.inner.tag_tasks.len()
    }

    /// Expiry threshold for tracked tasks, derived from the transport
    /// timeouts and the configured multiplier.
    pub fn preproc_timeout(&self) -> Duration {
        self.inner.config.preproc_timeout()
    }

    pub fn config(&self) -> &HttpConfig {
        &self.inner.config
    }

    pub fn dispatcher(&self) -> &TaskDispatcher {
        &self.inner.dispatcher
    }

    pub fn base_url(&self) -> Option<&str> {
        self.inner.base_url.as_deref()
    }

    /// Resolves the task's stored path against the configured base URL.
    pub fn task_url(&self, task: &HttpTask) -> Result<String> {
        self.full_url(Some(task.url()))
    }

    /// Resolves a request path against the configured base URL.
    ///
    /// Requesting a relative path (or no path at all) without a base URL is
    /// a configuration error, surfaced before any preprocessing happens.
    pub fn full_url(&self, path: Option<&str>) -> Result<String> {
        let base = self.inner.base_url.as_deref();
        match path {
            None => base
                .map(str::to_owned)
                .ok_or_else(|| UrlError::MissingBaseUrl.into()),
            Some(path) if path.starts_with("http://") || path.starts_with("https://") => {
                Ok(path.to_owned())
            }
            Some(path) => match base {
                Some(base) => Ok(format!("{base}{path}")),
                None => Err(UrlError::RelativeWithoutBase(path.to_owned()).into()),
            },
        }
    }
}

/// Builder fixing the pipeline and transport figures at construction time.
pub struct HttpClientBuilder {
    base_url: Option<String>,
    preprocessors: Vec<Arc<dyn Preprocessor>>,
    config: HttpConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            preprocessors: Vec::new(),
            config: HttpConfig::default(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends an ordinary preprocessor to the pipeline.
    pub fn add_preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessors.push(preprocessor);
        self
    }

    /// Appends a preprocessor wrapped so that at most one request runs
    /// through it at a time; the rest queue in arrival order.
    pub fn add_serial_preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessors
            .push(Arc::new(SerialPreprocessor::new(preprocessor)));
        self
    }

    pub fn build(self) -> HttpClient {
        let expire_after = self.config.preproc_timeout();
        HttpClient {
            inner: Arc::new(ClientInner {
                base_url: self.base_url,
                preprocessors: self.preprocessors.into(),
                tag_tasks: TagRegistry::new(expire_after),
                dispatcher: TaskDispatcher::new(),
                config: self.config,
            }),
        }
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
