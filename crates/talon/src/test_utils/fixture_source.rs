//! Deterministic Logtalk source generator for benchmarks and tests.
//!
//! Each generated object declares its predicates in a `public/1` list,
//! imports `list::member/2` through `uses/2`, and defines clauses that call
//! a shared `step/2` predicate. Nothing is random, so bench runs compare.

use std::fmt::Write;

/// Shape of a generated source file.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub object_count: usize,
    pub predicates_per_object: usize,
    pub clauses_per_predicate: usize,
    /// Extra goals per clause body, one per line.
    pub goals_per_clause: usize,
}

impl FixtureConfig {
    /// 5 objects, 4 predicates each.
    pub fn small() -> Self {
        Self {
            object_count: 5,
            predicates_per_object: 4,
            clauses_per_predicate: 2,
            goals_per_clause: 2,
        }
    }

    /// 25 objects, 10 predicates each.
    pub fn medium() -> Self {
        Self {
            object_count: 25,
            predicates_per_object: 10,
            clauses_per_predicate: 3,
            goals_per_clause: 3,
        }
    }

    /// 100 objects, 20 predicates each.
    pub fn large() -> Self {
        Self {
            object_count: 100,
            predicates_per_object: 20,
            clauses_per_predicate: 3,
            goals_per_clause: 4,
        }
    }
}

fn write_object(content: &mut String, index: usize, config: &FixtureConfig) {
    writeln!(content, ":- object(obj_{}).", index).unwrap();
    content.push('\n');

    let exported: Vec<String> = (0..config.predicates_per_object)
        .map(|p| format!("pred_{}/2", p))
        .collect();
    writeln!(content, "\t:- public([{}]).", exported.join(", ")).unwrap();
    writeln!(content, "\t:- uses(list, [member/2, append/3]).").unwrap();
    content.push('\n');

    for p in 0..config.predicates_per_object {
        writeln!(content, "\t:- mode(pred_{}(+list, -term), zero_or_more).", p).unwrap();
        for c in 0..config.clauses_per_predicate {
            writeln!(content, "\tpred_{}(Xs, Y) :-", p).unwrap();
            for g in 0..config.goals_per_clause {
                writeln!(content, "\t\tstep({}, T{}),", c + g, g).unwrap();
            }
            writeln!(content, "\t\tmember(Y, Xs).").unwrap();
        }
        content.push('\n');
    }

    writeln!(content, "\tstep(N, N).").unwrap();
    writeln!(content, ":- end_object.").unwrap();
    content.push('\n');
}

/// Generate a Logtalk source file for `config`.
pub fn generate_source(config: &FixtureConfig) -> String {
    let mut content = String::new();
    for index in 0..config.object_count {
        write_object(&mut content, index, config);
    }
    content
}

/// Zero-based numbers of lines containing `needle`, standing in for the
/// candidate locations a reference finder would report.
pub fn lines_containing(source: &str, needle: &str) -> Vec<u32> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| line.contains(needle))
        .map(|(i, _)| i as u32)
        .collect()
}
