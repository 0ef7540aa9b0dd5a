//! Supported languages: detection heuristics and build/run profiles.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The fixed set of languages the sandbox can build and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    Java,
    Python,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Cpp, Language::Java, Language::Python];

    /// Classify a raw source string. Ordered, first-match substring
    /// heuristics, not a parser.
    ///
    /// The negative check for the Java entry-point signature in the first
    /// rule is load-bearing: Java source contains `void main` too, and must
    /// never classify as C++.
    pub fn detect(code: &str) -> Option<Language> {
        if (code.contains("int main") || code.contains("void main"))
            && !code.contains("public static void main")
        {
            Some(Language::Cpp)
        } else if code.contains("public static void main") {
            Some(Language::Java)
        } else if code.contains("import") || code.contains("def ") || code.contains("class ") {
            Some(Language::Python)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
        }
    }

    pub fn profile(&self) -> &'static LanguageProfile {
        match self {
            Language::Cpp => &CPP_PROFILE,
            Language::Java => &JAVA_PROFILE,
            Language::Python => &PYTHON_PROFILE,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static build/run description for one language. Command templates take
/// `{dir}` (guest working directory) and `{entry}` (entry-point name,
/// without extension) placeholders.
pub struct LanguageProfile {
    pub extension: &'static str,
    /// The source file name must equal a public type name declared in the
    /// source (Java). Such languages also get a private guest subdirectory
    /// per job, since the file name itself is not collision-free.
    pub needs_entry_point: bool,
    pub compile_template: Option<&'static str>,
    pub run_template: &'static str,
}

static CPP_PROFILE: LanguageProfile = LanguageProfile {
    extension: "cpp",
    needs_entry_point: false,
    compile_template: Some("g++ -o {dir}/{entry} {dir}/{entry}.cpp"),
    run_template: "{dir}/{entry}",
};

static JAVA_PROFILE: LanguageProfile = LanguageProfile {
    extension: "java",
    needs_entry_point: true,
    compile_template: Some("javac {dir}/{entry}.java"),
    run_template: "java -cp {dir} {entry}",
};

static PYTHON_PROFILE: LanguageProfile = LanguageProfile {
    extension: "py",
    needs_entry_point: false,
    compile_template: None,
    run_template: "python3 {dir}/{entry}.py",
};

impl LanguageProfile {
    pub fn has_compile_step(&self) -> bool {
        self.compile_template.is_some()
    }

    pub fn compile_command(&self, dir: &str, entry: &str) -> Option<String> {
        self.compile_template
            .map(|template| render(template, dir, entry))
    }

    pub fn run_command(&self, dir: &str, entry: &str) -> String {
        render(self.run_template, dir, entry)
    }
}

fn render(template: &str, dir: &str, entry: &str) -> String {
    template.replace("{dir}", dir).replace("{entry}", entry)
}

/// Extract the declared public class name from Java source, if any.
pub fn extract_public_class_name(code: &str) -> Option<String> {
    static CLASS_RE: OnceLock<Regex> = OnceLock::new();
    let re = CLASS_RE.get_or_init(|| Regex::new(r"public\s+class\s+(\w+)").unwrap());
    re.captures(code)
        .map(|captures| captures[1].to_string())
}
