use super::{LanguageDefinition, LanguageKind};

const fn programming(
    name: &'static str,
    aliases: &'static [&'static str],
    extensions: &'static [&'static str],
) -> LanguageDefinition {
    LanguageDefinition {
        name,
        kind: LanguageKind::Programming,
        group: None,
        aliases,
        extensions,
        configuration_files: &[],
        exclude_folders: &[],
        can_be_component: true,
        can_be_container_component: false,
    }
}

const fn other(name: &'static str, kind: LanguageKind, extensions: &'static [&'static str]) -> LanguageDefinition {
    LanguageDefinition {
        name,
        kind,
        group: None,
        aliases: &[],
        extensions,
        configuration_files: &[],
        exclude_folders: &[],
        can_be_component: false,
        can_be_container_component: false,
    }
}

const GRADLE: &[&str] = &[r"^build\.gradle$", r"^build\.gradle\.kts$"];
const NODE: &[&str] = &[r"^package\.json$"];

pub(super) fn default_definitions() -> Vec<LanguageDefinition> {
    vec![
        LanguageDefinition {
            configuration_files: &[r"^pom\.xml$", r"^build\.gradle$", r"^build\.gradle\.kts$"],
            exclude_folders: &["target"],
            ..programming("Java", &[], &[".java"])
        },
        LanguageDefinition {
            configuration_files: GRADLE,
            exclude_folders: &["build"],
            ..programming("Kotlin", &["kt"], &[".kt", ".kts"])
        },
        LanguageDefinition {
            configuration_files: NODE,
            exclude_folders: &["node_modules"],
            ..programming("JavaScript", &["js", "node", "nodejs"], &[".js", ".cjs", ".mjs"])
        },
        LanguageDefinition {
            group: Some("JavaScript"),
            can_be_component: false,
            ..programming("JSX", &[], &[".jsx"])
        },
        LanguageDefinition {
            configuration_files: NODE,
            exclude_folders: &["node_modules"],
            ..programming("TypeScript", &["ts"], &[".ts", ".cts", ".mts"])
        },
        LanguageDefinition {
            group: Some("TypeScript"),
            can_be_component: false,
            ..programming("TSX", &[], &[".tsx"])
        },
        LanguageDefinition {
            configuration_files: &[
                r"^requirements\.txt$",
                r"^pyproject\.toml$",
                r"^setup\.py$",
                r"^Pipfile$",
            ],
            exclude_folders: &["__pycache__", "venv", ".venv"],
            ..programming("Python", &["python3", "py"], &[".py", ".pyw"])
        },
        LanguageDefinition {
            configuration_files: &[r"^go\.mod$"],
            exclude_folders: &["vendor"],
            ..programming("Go", &["golang"], &[".go"])
        },
        LanguageDefinition {
            configuration_files: &[r"^.+\.csproj$"],
            exclude_folders: &["bin", "obj"],
            ..programming("C#", &["csharp", "cs"], &[".cs"])
        },
        LanguageDefinition {
            configuration_files: &[r"^.+\.fsproj$"],
            exclude_folders: &["bin", "obj"],
            ..programming("F#", &["fsharp"], &[".fs", ".fsx"])
        },
        LanguageDefinition {
            configuration_files: &[r"^.+\.vbproj$"],
            exclude_folders: &["bin", "obj"],
            ..programming("Visual Basic .NET", &["vbnet", "vb.net"], &[".vb"])
        },
        LanguageDefinition {
            configuration_files: &[r"^composer\.json$"],
            exclude_folders: &["vendor"],
            ..programming("PHP", &["php"], &[".php"])
        },
        LanguageDefinition {
            configuration_files: &[r"^Cargo\.toml$"],
            exclude_folders: &["target"],
            ..programming("Rust", &["rs"], &[".rs"])
        },
        LanguageDefinition {
            configuration_files: &[r"^Gemfile$"],
            exclude_folders: &["vendor"],
            ..programming("Ruby", &["rb"], &[".rb"])
        },
        LanguageDefinition {
            configuration_files: &[r"^mix\.exs$"],
            exclude_folders: &["deps", "_build"],
            ..programming("Elixir", &["ex"], &[".ex", ".exs"])
        },
        programming("C", &[], &[".c", ".h"]),
        programming("C++", &["cpp"], &[".cpp", ".cc", ".cxx", ".hpp", ".hh"]),
        LanguageDefinition {
            can_be_component: false,
            ..programming("Shell", &["sh", "bash"], &[".sh", ".bash"])
        },
        LanguageDefinition {
            can_be_component: false,
            can_be_container_component: true,
            ..programming("Dockerfile", &["containerfile"], &[".dockerfile"])
        },
        other("HTML", LanguageKind::Markup, &[".html", ".htm"]),
        other("CSS", LanguageKind::Markup, &[".css", ".scss"]),
        other("JSON", LanguageKind::Data, &[".json"]),
        other("YAML", LanguageKind::Data, &[".yml", ".yaml"]),
        other("TOML", LanguageKind::Data, &[".toml"]),
        other("XML", LanguageKind::Data, &[".xml"]),
        other("Markdown", LanguageKind::Prose, &[".md"]),
    ]
}
