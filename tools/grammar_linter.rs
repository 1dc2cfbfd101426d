/// Grammar Linter: validates a phrasing grammar before it goes on air.
///
/// Usage: grammar_linter <grammar_file_or_dir> [--standalone]
///
/// By default the grammar is checked as an override layered on the built-in
/// baseball grammar, the way `Narrator::builder().grammar_file()` loads it.
/// `--standalone` checks it as a complete replacement.

use log::debug;
use pitchcast::core::grammar::{GrammarSet, TemplateSegment};
use pitchcast::core::narrator::{
    unmentioned_fields, BOUND_FIELDS, DEFAULT_GRAMMAR, PITCH_RULES, REQUIRED_FIELDS,
};
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: grammar_linter <grammar_file_or_dir> [--standalone]");
        process::exit(0);
    }

    let grammar_arg = &args[1];
    let standalone = args[2..].iter().any(|a| a == "--standalone");

    let mut user = GrammarSet::default();
    let grammar_path = Path::new(grammar_arg);

    if grammar_path.is_file() {
        match GrammarSet::load_from_ron(grammar_path) {
            Ok(gs) => user.merge(gs),
            Err(e) => {
                eprintln!("ERROR: Failed to load grammar file: {}", e);
                process::exit(1);
            }
        }
    } else if grammar_path.is_dir() {
        load_grammars_recursive(grammar_path, &mut user);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", grammar_arg);
        process::exit(1);
    }

    println!("Loaded {} grammar rules", user.rules.len());

    let effective = if standalone {
        user.clone()
    } else {
        match GrammarSet::parse_ron(DEFAULT_GRAMMAR) {
            Ok(mut base) => {
                base.merge(user.clone());
                base
            }
            Err(e) => {
                eprintln!("ERROR: built-in grammar failed to parse: {}", e);
                process::exit(1);
            }
        }
    };

    let (errors, warnings) = lint_grammars(&user, &effective, standalone);

    println!("\n=== Grammar Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_grammars_recursive(dir: &Path, grammars: &mut GrammarSet) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_grammars_recursive(&path, grammars);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                match GrammarSet::load_from_ron(&path) {
                    Ok(gs) => {
                        println!("  Loaded: {}", path.display());
                        grammars.merge(gs);
                    }
                    Err(e) => {
                        eprintln!("  ERROR loading {}: {}", path.display(), e);
                    }
                }
            }
        }
    }
}

/// `user` holds only the rules under review; `effective` is what the
/// narrator would actually run with.
fn lint_grammars(
    user: &GrammarSet,
    effective: &GrammarSet,
    standalone: bool,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Coverage: every rule the narrator may ask for
    for rule_name in PITCH_RULES {
        if !effective.rules.contains_key(rule_name) {
            errors.push(format!("Missing pitch rule '{}'", rule_name));
        } else if !standalone && !user.rules.contains_key(rule_name) {
            debug!("'{}' comes from the built-in grammar", rule_name);
        }
    }

    for (name, rule) in &user.rules {
        if rule.alternatives.len() < 3 {
            warnings.push(format!(
                "Rule '{}' has only {} alternatives (minimum 3 recommended)",
                name,
                rule.alternatives.len()
            ));
        }

        if rule.alternatives.iter().all(|a| a.weight == 0) {
            errors.push(format!("Rule '{}' has no alternative with positive weight", name));
        }

        let is_pitch_rule = PITCH_RULES.contains(&name.as_str());
        for (i, alt) in rule.alternatives.iter().enumerate() {
            let fields: Vec<&str> = alt.template.fields().collect();

            for field in &fields {
                if !BOUND_FIELDS.contains(field) {
                    errors.push(format!(
                        "Rule '{}' alternative {} uses unknown field 'call.{}'",
                        name, i, field
                    ));
                }
            }

            if is_pitch_rule {
                for required in REQUIRED_FIELDS {
                    if !fields.contains(&required) {
                        errors.push(format!(
                            "Pitch rule '{}' alternative {} never says 'call.{}'",
                            name, i, required
                        ));
                    }
                }
                for name_field in unmentioned_fields(name) {
                    if fields.contains(name_field) {
                        errors.push(format!(
                            "Pitch rule '{}' alternative {} names 'call.{}', which is never bound for it",
                            name, i, name_field
                        ));
                    }
                }
            }

            for segment in &alt.template.segments {
                if let TemplateSegment::RuleRef(ref_name) = segment {
                    if !effective.rules.contains_key(ref_name.as_str()) {
                        errors.push(format!(
                            "Rule '{}' references non-existent rule '{}'",
                            name, ref_name
                        ));
                    }
                }
            }
        }
    }

    // Direct self-reference with no way out
    for (name, rule) in &user.rules {
        let all_self_ref = !rule.alternatives.is_empty()
            && rule.alternatives.iter().all(|a| {
                a.template
                    .segments
                    .iter()
                    .any(|s| matches!(s, TemplateSegment::RuleRef(r) if r == name))
            });
        if all_self_ref {
            errors.push(format!(
                "Rule '{}' has no non-recursive alternative (infinite recursion)",
                name
            ));
        }
    }

    (errors, warnings)
}
