//! CLI entry point for needful_script.
//! Usage: cargo run -p needful_script -- lint <file.macro | macros.toml> [--settings <settings.toml>]

use std::{env, fs, process};

use needful_data::{MacroLibrary, Settings, validate_library, validate_settings};
use needful_script::help::{MODIFIERS, VERBS};
use needful_script::{CommandKind, CraftLoopTemplate, MacroParser, ParseOptions, rewrite};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Accept both `cargo run -- <cmd>` and a direct `<bin> <cmd>` invocation
    let rest: &[String] = match args.as_slice() {
        [_, flag, tail @ ..] if flag == "--" => tail,
        [_, tail @ ..] => tail,
        [] => &[],
    };
    match rest {
        [cmd, tail @ ..] if cmd == "lint" => run_lint(tail),
        [cmd, tail @ ..] if cmd == "expand" => run_expand(tail),
        [cmd] if cmd == "verbs" => print_verbs(),
        _ => {
            eprintln!(
                "Usage:\n  needful_script lint <file.macro | macros.toml> [--settings <settings.toml>]\n  \
                 needful_script expand <file.macro> --count <n> [--synthesis] [--settings <settings.toml>]\n  \
                 needful_script verbs"
            );
            process::exit(2);
        },
    }
}

/// Split `--settings <path>` and bare flags from positional arguments.
fn parse_flags(args: &[String]) -> (Vec<String>, Option<String>, Vec<(String, Option<String>)>) {
    let mut positional = Vec::new();
    let mut settings = None;
    let mut flags = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--settings" | "--count" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("{} requires a value", args[i]);
                    process::exit(2);
                };
                if args[i] == "--settings" {
                    settings = Some(value.clone());
                } else {
                    flags.push((args[i].clone(), Some(value.clone())));
                }
                i += 2;
            },
            flag if flag.starts_with("--") => {
                flags.push((flag.to_string(), None));
                i += 1;
            },
            other => {
                positional.push(other.to_string());
                i += 1;
            },
        }
    }
    (positional, settings, flags)
}

fn load_settings(path: Option<&str>) -> Settings {
    let Some(path) = path else {
        return Settings::default();
    };
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: unable to read '{path}': {e}");
        process::exit(1);
    });
    let settings: Settings = toml::from_str(&text).unwrap_or_else(|e| {
        eprintln!("error: parsing '{path}': {e}");
        process::exit(1);
    });
    for problem in validate_settings(&settings) {
        eprintln!("warning: {path}: {problem}");
    }
    settings
}

fn run_lint(args: &[String]) {
    let (positional, settings_path, _) = parse_flags(args);
    let [path] = positional.as_slice() else {
        eprintln!("Usage: needful_script lint <file.macro | macros.toml> [--settings <settings.toml>]");
        process::exit(2);
    };
    let settings = load_settings(settings_path.as_deref());
    let parser = MacroParser::new(ParseOptions::from_settings(&settings));
    let src = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: unable to read '{path}': {e}");
        process::exit(1);
    });

    let problems = if path.ends_with(".toml") {
        let library: MacroLibrary = toml::from_str(&src).unwrap_or_else(|e| {
            eprintln!("error: parsing '{path}': {e}");
            process::exit(1);
        });
        lint_library(&library, &parser)
    } else {
        lint_source(path, &src, &parser, None)
    };

    if problems == 0 {
        eprintln!("lint: OK");
    } else {
        eprintln!("lint: {problems} problem(s)");
        process::exit(1);
    }
}

fn lint_library(library: &MacroLibrary, parser: &MacroParser) -> usize {
    let mut problems = 0;
    for err in validate_library(library) {
        eprintln!("library: {err}");
        problems += 1;
    }
    for def in library.all_macros() {
        problems += lint_source(&def.name, &def.contents, parser, Some(library));
    }
    problems
}

fn lint_source(label: &str, src: &str, parser: &MacroParser, library: Option<&MacroLibrary>) -> usize {
    let commands = match parser.parse_macro(src) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("{label}: {e}");
            return 1;
        },
    };
    let mut problems = 0;
    if let Some(library) = library {
        for cmd in &commands {
            if let CommandKind::RunMacro { name } = cmd.kind()
                && let Err(e) = library.find_unique(name)
            {
                eprintln!("{label}: {}: {e}", cmd.text());
                problems += 1;
            }
        }
    }
    problems
}

fn run_expand(args: &[String]) {
    let (positional, settings_path, flags) = parse_flags(args);
    let [path] = positional.as_slice() else {
        eprintln!("Usage: needful_script expand <file.macro> --count <n> [--synthesis]");
        process::exit(2);
    };
    let count = flags
        .iter()
        .find(|(flag, _)| flag == "--count")
        .and_then(|(_, value)| value.as_deref())
        .map_or(Ok(-1), str::parse::<i32>)
        .unwrap_or_else(|e| {
            eprintln!("error: --count: {e}");
            process::exit(2);
        });
    let settings = load_settings(settings_path.as_deref());
    let from_crafting_log = if flags.iter().any(|(flag, _)| flag == "--synthesis") {
        false
    } else {
        settings.craft_loop_from_recipe_note
    };
    let src = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: unable to read '{path}': {e}");
        process::exit(1);
    });
    let out = rewrite(&src, from_crafting_log, count, &CraftLoopTemplate::from_settings(&settings));
    for warning in &out.warnings {
        eprintln!("warning: {warning}");
    }
    println!("{}", out.text);
}

fn print_verbs() {
    for verb in VERBS {
        match verb.alias {
            Some(alias) => println!("/{} (/{alias})", verb.name),
            None => println!("/{}", verb.name),
        }
        println!("    {}", verb.description);
        if !verb.modifiers.is_empty() {
            println!("    modifiers: {}", verb.modifiers.join(", "));
        }
        for example in verb.examples {
            println!("    {example}");
        }
    }
    println!();
    for modifier in MODIFIERS {
        println!("<{}>  {}", modifier.name, modifier.description);
    }
}
