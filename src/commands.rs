//! Command Façade: one request/response call per store operation.
//!
//! Calls are forwarded to the [`CatalogStore`] as-is and store errors come back
//! unchanged. [`serve`] exposes the same calls as line-delimited JSON so a UI
//! in another process can drive the catalog.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::Command;

use crate::error::{CatalogError, Result};
use crate::models::{CatalogExport, Map, Nade, NadeInput};
use crate::store::{CatalogStore, NadeFilters};

/// Opens URLs or files in an external viewer
pub trait LinkOpener {
    fn open(&self, target: &str) -> std::io::Result<()>;
}

/// Hands the target to the platform's default handler
#[derive(Debug, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    #[cfg(target_os = "macos")]
    fn open(&self, target: &str) -> std::io::Result<()> {
        Command::new("open").arg(target).spawn()?;
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn open(&self, target: &str) -> std::io::Result<()> {
        Command::new("xdg-open").arg(target).spawn()?;
        Ok(())
    }

    #[cfg(target_os = "windows")]
    fn open(&self, target: &str) -> std::io::Result<()> {
        Command::new("cmd").args(["/C", "start", "", target]).spawn()?;
        Ok(())
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    fn open(&self, _target: &str) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "Opening links is not supported on this platform",
        ))
    }
}

pub struct CommandFacade<O: LinkOpener = SystemOpener> {
    store: CatalogStore,
    opener: O,
}

impl CommandFacade<SystemOpener> {
    pub fn new(store: CatalogStore) -> Self {
        Self::with_opener(store, SystemOpener)
    }
}

impl<O: LinkOpener> CommandFacade<O> {
    pub fn with_opener(store: CatalogStore, opener: O) -> Self {
        Self { store, opener }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn list_maps(&self) -> Result<Vec<Map>> {
        self.store.list_maps()
    }

    pub fn add_map(&self, name: &str) -> Result<Vec<Map>> {
        self.store.add_map(name)
    }

    pub fn list_nades(&self, filters: &NadeFilters) -> Result<Vec<Nade>> {
        self.store.list_nades(filters)
    }

    pub fn get_nade(&self, id: i64) -> Result<Option<Nade>> {
        self.store.get_nade(id)
    }

    pub fn create_nade(&self, input: &NadeInput) -> Result<i64> {
        self.store.create_nade(input)
    }

    pub fn update_nade(&self, id: i64, input: &NadeInput) -> Result<bool> {
        self.store.update_nade(id, input)?;
        Ok(true)
    }

    pub fn delete_nade(&self, id: i64) -> Result<bool> {
        self.store.delete_nade(id)?;
        Ok(true)
    }

    pub fn export_json(&self) -> Result<CatalogExport> {
        self.store.export()
    }

    pub fn import_json(&mut self, payload: &CatalogExport) -> Result<bool> {
        self.store.import(payload)?;
        Ok(true)
    }

    pub fn open_external_link(&self, url: &str) -> Result<bool> {
        debug!("Opening {}", url);
        self.opener.open(url)?;
        Ok(true)
    }

    pub fn check_file_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    /// Execute one decoded request
    pub fn dispatch(&mut self, request: Request) -> Result<Response> {
        let response = match request {
            Request::ListMaps => Response::Maps(self.list_maps()?),
            Request::AddMap { name } => Response::Maps(self.add_map(&name)?),
            Request::ListNades(filters) => Response::Nades(self.list_nades(&filters)?),
            Request::GetNade { id } => Response::Nade(self.get_nade(id)?),
            Request::CreateNade(input) => Response::Id(self.create_nade(&input)?),
            Request::UpdateNade { id, input } => Response::Success(self.update_nade(id, &input)?),
            Request::DeleteNade { id } => Response::Success(self.delete_nade(id)?),
            Request::Export => Response::Export(self.export_json()?),
            Request::Import(payload) => Response::Success(self.import_json(&payload)?),
            Request::OpenLink { url } => Response::Success(self.open_external_link(&url)?),
            Request::FileExists { path } => Response::Success(self.check_file_exists(&path)),
        };
        Ok(response)
    }

    /// Decode one JSON request line, run it, and encode the reply envelope
    pub fn handle_line(&mut self, line: &str) -> Envelope {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                debug!("Request: {:?}", request);
                match self.dispatch(request) {
                    Ok(result) => Envelope::ok(result),
                    Err(err) => {
                        warn!("Request failed: {}", err);
                        Envelope::error(err.kind(), err.to_string())
                    }
                }
            }
            Err(err) => {
                warn!("Malformed request: {}", err);
                Envelope::error("BadRequest", err.to_string())
            }
        }
    }
}

/// Requests accepted by the façade, tagged with the command name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", content = "params")]
pub enum Request {
    #[serde(rename = "maps:list")]
    ListMaps,
    #[serde(rename = "maps:add")]
    AddMap { name: String },
    #[serde(rename = "nades:list")]
    ListNades(NadeFilters),
    #[serde(rename = "nades:get")]
    GetNade { id: i64 },
    #[serde(rename = "nades:create")]
    CreateNade(NadeInput),
    #[serde(rename = "nades:update")]
    UpdateNade { id: i64, input: NadeInput },
    #[serde(rename = "nades:delete")]
    DeleteNade { id: i64 },
    #[serde(rename = "nades:export")]
    Export,
    #[serde(rename = "nades:import")]
    Import(CatalogExport),
    #[serde(rename = "video:open")]
    OpenLink { url: String },
    #[serde(rename = "file:exists")]
    FileExists { path: String },
}

/// Results returned by the façade
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Maps(Vec<Map>),
    Nades(Vec<Nade>),
    Nade(Option<Nade>),
    Id(i64),
    Success(bool),
    Export(CatalogExport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// Wire envelope written for every request line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Envelope {
    pub fn ok(result: Response) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(ErrorBody {
                kind: kind.into(),
                message: message.into(),
            }),
        }
    }
}

/// Serve requests read line by line from `input`, one reply line per request
pub fn serve<O: LinkOpener>(
    facade: &mut CommandFacade<O>,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<usize> {
    let mut handled = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let envelope = facade.handle_line(&line);
        serde_json::to_writer(&mut output, &envelope).map_err(CatalogError::from)?;
        output.write_all(b"\n")?;
        output.flush()?;
        handled += 1;
    }
    Ok(handled)
}
