//! Sample corpus, metadata and profiles shared by integration tests.

use super::cli::Workspace;
use std::path::PathBuf;

pub const API_CORE: &str = r#"{
  "$schema": "./source-format.schema.json",
  "suite": "api_core",
  "version": "1.0",
  "description": "Core parsing",
  "tests": [
    {
      "name": "basic_pairs",
      "input": "a = 1\nb = 2",
      "validations": {
        "parse": [{"key": "a", "value": "1"}, {"key": "b", "value": "2"}],
        "build_hierarchy": {"count": 1, "expected": {"a": "1", "b": "2"}}
      },
      "meta": {"tags": ["function:parse", "function:build_hierarchy"], "level": 1}
    },
    {
      "name": "tabs_preserved",
      "input": "a =\tvalue",
      "validations": {
        "parse": {"count": 1, "expected": [{"key": "a", "value": "\tvalue"}]}
      },
      "meta": {
        "tags": ["function:parse", "behavior:tabs_as_content"],
        "level": 1,
        "conflicts": ["behavior:tabs_as_whitespace"]
      }
    },
    {
      "name": "tabs_trimmed",
      "input": "a =\tvalue",
      "validations": {
        "parse": [{"key": "a", "value": "value"}]
      },
      "meta": {
        "tags": ["function:parse", "behavior:tabs_as_whitespace"],
        "level": 1,
        "conflicts": ["behavior:tabs_as_content"]
      }
    },
    {
      "name": "missing_equals",
      "input": "no equals here",
      "validations": {
        "parse": {"error": true, "error_message": "missing '='"}
      },
      "meta": {"tags": ["function:parse"], "level": 1}
    }
  ]
}
"#;

pub const TYPED_ACCESS: &str = r#"{
  "suite": "typed_access",
  "tests": [
    {
      "name": "port_number",
      "input": "port = 8080",
      "validations": {
        "parse": [{"key": "port", "value": "8080"}],
        "get_int": {"cases": [{"args": ["port"], "expected": 8080}]}
      },
      "meta": {"tags": ["function:get_int", "feature:comments"], "level": 3}
    },
    {
      "name": "bool_strict",
      "input": "flag = yes",
      "validations": {
        "get_bool": {"cases": [{"args": ["flag"], "error": true, "error_message": "not a boolean"}]}
      },
      "meta": {
        "tags": ["function:get_bool", "behavior:boolean_strict"],
        "level": 3,
        "conflicts": ["behavior:boolean_lenient"]
      }
    },
    {
      "name": "bool_lenient",
      "input": "flag = yes",
      "validations": {
        "get_bool": {"cases": [{"args": ["flag"], "expected": true}]}
      },
      "meta": {
        "tags": ["function:get_bool", "behavior:boolean_lenient"],
        "level": 3,
        "conflicts": ["behavior:boolean_strict"]
      }
    }
  ]
}
"#;

/// Same as a bad suite authors produce: a parse payload that is not a list.
pub const BROKEN_SHAPES: &str = r#"{
  "suite": "broken",
  "tests": [
    {
      "name": "scalar_parse",
      "input": "a = 1",
      "validations": {"parse": "a = 1", "get_string": {"cases": []}}
    },
    {
      "name": "bad_entry",
      "input": "a = 1",
      "validations": {"parse": [{"key": "a"}]}
    }
  ]
}
"#;

pub const METADATA: &str = r#"{
  "behaviors": {
    "tabs_as_content": {
      "description": "Tabs are part of values",
      "affectedFunctions": ["parse"],
      "mutuallyExclusiveWith": ["tabs_as_whitespace"]
    },
    "tabs_as_whitespace": {
      "description": "Tabs are trimmed like spaces",
      "affectedFunctions": ["parse"],
      "mutuallyExclusiveWith": ["tabs_as_content"]
    },
    "boolean_strict": {
      "description": "Only true/false",
      "affectedFunctions": ["get_bool"],
      "mutuallyExclusiveWith": ["boolean_lenient"]
    },
    "boolean_lenient": {
      "description": "yes/no/on/off accepted",
      "affectedFunctions": ["get_bool"],
      "mutuallyExclusiveWith": ["boolean_strict"]
    }
  },
  "defaults": {"unmappedBehavior": "global"}
}
"#;

pub const FULL_PROFILE: &str = "\
name: full
functions: [parse, build_hierarchy, get_int, get_bool]
features: [comments]
behaviors:
  crlf_handling: crlf_normalize_to_lf
  tab_handling: tabs_as_whitespace
  indent_output: indent_spaces
  boolean: boolean_lenient
  list_coercion: list_coercion_disabled
variants: [proposed_behavior]
";

pub const PARSE_ONLY_PROFILE: &str = "\
name: parse-only
functions: [parse]
behaviors: [crlf_normalize_to_lf, tabs_as_content, indent_spaces, boolean_strict, list_coercion_enabled]
variants: [reference_compliant]
";

pub const INCOMPLETE_PROFILE: &str = "\
functions: [parse]
behaviors: [tabs_as_content]
";

/// `tests/api_core.json`, `tests/typed_access.json` and a schema file that
/// discovery must ignore.
pub fn write_corpus(workspace: &Workspace) -> PathBuf {
    workspace.write("tests/api_core.json", API_CORE);
    workspace.write("tests/typed_access.json", TYPED_ACCESS);
    workspace.write("tests/source-format.schema.json", r#"{"type": "object"}"#);
    workspace.path("tests")
}

pub fn write_metadata(workspace: &Workspace) -> PathBuf {
    workspace.write("behavior-metadata.json", METADATA)
}
