use super::{find_file, ports_in_sources, read_file, Enricher};
use crate::detection::Language;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Module path prefix to framework name
const FRAMEWORKS: &[(&str, &str)] = &[
    ("github.com/gin-gonic/gin", "Gin"),
    ("github.com/labstack/echo", "Echo"),
    ("github.com/gofiber/fiber", "Fiber"),
    ("github.com/beego/beego", "Beego"),
    ("github.com/astaxie/beego", "Beego"),
    ("github.com/gorilla/mux", "Mux"),
];

pub struct GoEnricher {
    fs: Arc<dyn FileSystem>,
}

impl GoEnricher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

fn module_regex() -> &'static Regex {
    static MODULE: OnceLock<Regex> = OnceLock::new();
    MODULE.get_or_init(|| Regex::new(r"(?m)^module\s+(\S+)").expect("valid regex"))
}

fn listen_regex() -> &'static Regex {
    static LISTEN: OnceLock<Regex> = OnceLock::new();
    LISTEN.get_or_init(|| {
        Regex::new(r#"(?:ListenAndServe|Listen|Run|Start)\(\s*"[^":]*:(\d+)""#).expect("valid regex")
    })
}

impl Enricher for GoEnricher {
    fn supported_languages(&self) -> &'static [&'static str] {
        &["Go"]
    }

    fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn enrich_language(&self, language: &mut Language, files: &[PathBuf]) {
        let Some(content) = find_file(files, &["go.mod"]).and_then(|p| read_file(self.fs.as_ref(), p)) else {
            return;
        };
        language.add_tool("Go Modules");
        for (module, framework) in FRAMEWORKS {
            if content.contains(module) {
                language.add_framework(framework);
            }
        }
    }

    fn project_name(&self, dir: &Path) -> Option<String> {
        let go_mod = dir.join("go.mod");
        if !self.fs.is_file(&go_mod) {
            return None;
        }
        let content = read_file(self.fs.as_ref(), &go_mod)?;
        let module = module_regex().captures(&content)?.get(1)?.as_str();
        module.rsplit('/').next().map(String::from)
    }

    fn source_ports(&self, _dir: &Path, files: &[PathBuf]) -> Vec<u16> {
        ports_in_sources(self.fs.as_ref(), files, &["go"], listen_regex())
    }
}
