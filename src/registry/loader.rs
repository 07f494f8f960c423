//! Module discovery.
//!
//! Walks the module-source root once, synchronously, at startup. Every
//! subdirectory must carry a `module.json` descriptor; a server unit and a
//! client unit (script + templates) are both optional. Modules are trusted,
//! first-party configuration, so any descriptor problem aborts startup.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{LoadError, ModuleDescriptor};

use super::module::{HostContext, ModuleCatalog, RealtimeContext, ServerModule};

/// Descriptor file expected in every module directory.
const DESCRIPTOR_FILE: &str = "module.json";
/// Optional client entry point.
const CLIENT_FILE: &str = "client.js";
/// Optional directory of template sources.
const TEMPLATES_DIR: &str = "templates";

/// A module's client-side contribution: raw script text plus named template
/// sources, rendered into one bundle fragment.
#[derive(Debug, Clone, Default)]
pub struct ClientUnit {
    /// Template sources as (name, source) pairs, in file order. The name is
    /// the source file's stem.
    pub templates: Vec<(String, String)>,

    /// Raw script text from the client entry point.
    pub script: Option<String>,
}

impl ClientUnit {
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty() && self.script.is_none()
    }

    /// Renders this unit's bundle fragment: one registration statement per
    /// template into the shared `pc.Templates` namespace, then the script.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, source) in &self.templates {
            // json-encode both sides so arbitrary template text stays a
            // valid JS string literal
            out.push_str(&format!(
                "pc.Templates[{}] = Handlebars.compile({});\n",
                serde_json::Value::from(name.as_str()),
                serde_json::Value::from(source.as_str()),
            ));
        }
        if let Some(script) = &self.script {
            out.push_str(script);
            if !script.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

/// One discovered module: descriptor plus its optional server and client
/// units.
pub struct LoadedModule {
    pub descriptor: ModuleDescriptor,
    pub server: Option<Arc<dyn ServerModule>>,
    pub client: Option<ClientUnit>,
}

/// Discovers module directories and produces [`LoadedModule`]s in listing
/// order.
pub struct ModuleLoader {
    catalog: ModuleCatalog,
    host: HostContext,
    realtime: RealtimeContext,
}

impl ModuleLoader {
    pub fn new(catalog: ModuleCatalog, host: HostContext, realtime: RealtimeContext) -> Self {
        Self {
            catalog,
            host,
            realtime,
        }
    }

    /// Loads every module under `root`, sorted by directory name.
    ///
    /// # Errors
    ///
    /// Fails fast on the first unreadable directory, missing or invalid
    /// descriptor, or factory failure; later modules are never touched.
    pub fn load_all(&self, root: &Path) -> Result<Vec<LoadedModule>, LoadError> {
        let mut dirs: Vec<_> = fs::read_dir(root)
            .map_err(|e| LoadError::io(root, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LoadError::io(root, e))?
            .into_iter()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.path())
            .collect();
        dirs.sort();

        let mut loaded = Vec::with_capacity(dirs.len());
        for dir in dirs {
            loaded.push(self.load_module(&dir)?);
        }
        Ok(loaded)
    }

    fn load_module(&self, dir: &Path) -> Result<LoadedModule, LoadError> {
        let module_dir = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let descriptor = self.read_descriptor(dir, &module_dir)?;
        debug!(module = %descriptor.name, dir = %module_dir, "discovered module");

        let server = match self
            .catalog
            .instantiate(&descriptor.name, &self.host, &self.realtime)
        {
            Some(result) => Some(result?),
            None => None,
        };

        let client = self.read_client(dir)?;

        Ok(LoadedModule {
            descriptor,
            server,
            client,
        })
    }

    fn read_descriptor(&self, dir: &Path, module_dir: &str) -> Result<ModuleDescriptor, LoadError> {
        let path = dir.join(DESCRIPTOR_FILE);
        if !path.is_file() {
            return Err(LoadError::DescriptorMissing {
                module: module_dir.to_string(),
                path,
            });
        }
        let raw = fs::read_to_string(&path).map_err(|e| LoadError::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|source| LoadError::DescriptorParse {
            module: module_dir.to_string(),
            source,
        })
    }

    fn read_client(&self, dir: &Path) -> Result<Option<ClientUnit>, LoadError> {
        let mut unit = ClientUnit::default();

        let templates_dir = dir.join(TEMPLATES_DIR);
        if templates_dir.is_dir() {
            let mut files: Vec<_> = fs::read_dir(&templates_dir)
                .map_err(|e| LoadError::io(&templates_dir, e))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| LoadError::io(&templates_dir, e))?
                .into_iter()
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect();
            files.sort();

            for path in files {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let source = fs::read_to_string(&path).map_err(|e| LoadError::io(&path, e))?;
                unit.templates.push((name, source));
            }
        }

        let client_path = dir.join(CLIENT_FILE);
        if client_path.is_file() {
            let script =
                fs::read_to_string(&client_path).map_err(|e| LoadError::io(&client_path, e))?;
            unit.script = Some(script);
        }

        Ok(if unit.is_empty() { None } else { Some(unit) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_registers_templates_before_script_in_file_order() {
        let unit = ClientUnit {
            templates: vec![
                ("a".to_string(), "<a>{{x}}</a>".to_string()),
                ("b".to_string(), "<b></b>".to_string()),
            ],
            script: Some("S();".to_string()),
        };
        let rendered = unit.render();

        let a = rendered.find(r#"pc.Templates["a"]"#).unwrap();
        let b = rendered.find(r#"pc.Templates["b"]"#).unwrap();
        let script = rendered.find("S();").unwrap();
        assert!(a < b);
        assert!(b < script);
    }

    #[test]
    fn render_escapes_template_source() {
        let unit = ClientUnit {
            templates: vec![("t".to_string(), "line1\n\"quoted\"".to_string())],
            script: None,
        };
        let rendered = unit.render();
        assert!(rendered.contains(r#"Handlebars.compile("line1\n\"quoted\"")"#));
    }

    #[test]
    fn render_of_script_only_unit_is_just_the_script() {
        let unit = ClientUnit {
            templates: Vec::new(),
            script: Some("S();\n".to_string()),
        };
        assert_eq!(unit.render(), "S();\n");
    }

    #[test]
    fn empty_unit_reports_empty() {
        assert!(ClientUnit::default().is_empty());
    }
}
