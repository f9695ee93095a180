use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};

const SYNTAX: CommentSyntax = CommentSyntax {
    line: &["#"],
    doc_line: &[],
    block: &[("=begin", "=end")],
    doc_block: &[],
    quotes: &['"', '\''],
    multiline_strings: &[],
    docstrings: false,
    block_at_line_start: true,
};

const KEYWORDS: &[&str] = &[
    "if", "unless", "else", "elsif", "while", "until", "for", "case", "when", "begin", "rescue",
    "ensure", "return", "raise", "yield", "do", "end", "then", "next", "break", "puts", "require",
    "require_relative", "include", "extend", "attr_reader", "attr_writer", "attr_accessor",
    "private", "protected", "public", "self",
];

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        functions: vec![re(r"^\s*def\s+(?:self\.)?(?P<name>\w+[?!]?)=?\s*\(?(?P<params>[^)#;]*)")],
        classes: vec![re(r"^\s*(?:class|module)\s+(?:[A-Z]\w*::)*(?P<name>[A-Z]\w*)")],
        variables: vec![re(r"^\s*(?P<name>@{0,2}[a-z_]\w*)\s*(?:\|\|)?=[^=~>]")],
        function_case: &[Case::Snake],
        class_case: &[Case::Pascal],
        variable_case: &[Case::Snake],
        comments_document: true,
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|elsif|unless|while|until|for|when|rescue|and|or)\b|&&|\|\||\s\?\s")),
        control: Some(re(r"^\s*(?:if|unless|case|begin)\b")),
        loops: Some(re(r"^\s*(?:while|until|for)\b|\.(?:each\w*|map|times|select|flat_map|upto|downto)\b.*\bdo\b")),
        exits: Some(re(r"\b(?:return|raise|next|break)\b")),
        guard: Some(re(r"^\s*begin\b")),
        risk: Some(re(r"\b(?:File\.(?:read|open|write|readlines)|JSON\.parse|YAML\.load|Net::HTTP\.\w+|Integer|Float)\s*\(|\bHTTParty\.\w+")),
        checks: Some(re(r"\b(?:raise|rescue)\b|\.nil\?|\b(?:is_a|kind_of)\?|\.(?:blank|empty|present)\?")),
        test_path: Some(re(r"_spec\.rb$|_test\.rb$|(?:^|/)(?:spec|test)/")),
        test_function: Some(re(r#"^\s*(?:it|specify|scenario|test)\s+["']|^\s*def\s+test_\w+"#)),
        assertion: Some(re(r"\bexpect\s*[({]|\bassert(?:_\w+)?\b|\brefute(?:_\w+)?\b|\.should\b")),
        io: Some(re(r"\b(?:File\.\w+|IO\.\w+|puts|print|Net::HTTP\.\w+|HTTParty\.\w+)|\.(?:save|create|update)!?\s*[(\s]")),
        concat: Some(re(r#"\+=\s*["']|<<\s*["']"#)),
        imports: vec![re(r#"^\s*require(?:_relative)?\s*\(?\s*["'](?P<target>[^"']+)["']"#)],
        openers: Some(re(
            r"^\s*(?:def|class|module|if|unless|while|until|for|case|begin)\b|\bdo\b\s*(?:\|[^|]*\|)?\s*$",
        )),
        closers: Some(re(r"^\s*end\b")),
        ..LanguageRules::base(Language::Ruby, SYNTAX, BlockStyle::Keywords)
    }
    .with_dangers(vec![
        Danger::code("eval", r"\b(?:eval|instance_eval|class_eval)\b"),
        Danger::code("command_injection", r"\b(?:system|exec|spawn)\s*\(|%x[({\[]"),
        Danger::code("unsafe_deserialization", r"\bMarshal\.load\b|\bYAML\.load\s*\("),
        Danger::code("unsafe_reflection", r"\b(?:send|public_send|constantize)\s*\(\s*params\b"),
    ])
});

pub struct Ruby;

impl LanguageAnalyzer for Ruby {
    fn language(&self) -> Language {
        Language::Ruby
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        pattern::extract(file, &RULES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOADER: &str = "\
# frozen_string_literal: true\n\
\n\
require 'json'\n\
require_relative 'lib/store'\n\
\n\
# Loads orders from disk.\n\
class OrderLoader\n\
  attr_reader :path\n\
\n\
  # Reads and parses the file.\n\
  def load(path)\n\
    begin\n\
      data = File.read(path)\n\
      JSON.parse(data)\n\
    rescue Errno::ENOENT\n\
      raise ArgumentError, \"missing #{path}\"\n\
    end\n\
  end\n\
\n\
  def each_total(orders)\n\
    orders.each do |order|\n\
      next if order.nil?\n\
      puts order.total\n\
    end\n\
  end\n\
\n\
  def valid?\n\
    !@path.nil?\n\
  end\n\
end\n";

    fn facts(path: &str, src: &str) -> FileFacts {
        Ruby.extract(&SourceFile::from_content(path, Language::Ruby, src))
    }

    #[test]
    fn test_keyword_blocks() {
        let facts = facts("lib/order_loader.rb", LOADER);
        assert_eq!(facts.classes[0].name, "OrderLoader");
        assert_eq!(facts.classes[0].methods, 3);
        assert_eq!(facts.functions[0].lines, 8);
        assert_eq!(facts.functions[1].max_loop_depth, 1);
        assert_eq!(facts.functions[1].io_in_loop, 1);
        assert_eq!(facts.functions[2].name, "valid?");
    }

    #[test]
    fn test_begin_rescue_guards() {
        let facts = facts("lib/order_loader.rb", LOADER);
        assert_eq!(facts.errors.risk, 2);
        assert_eq!(facts.errors.guarded, 2);
        assert_eq!(facts.errors.checks, 4);
    }

    #[test]
    fn test_comments_document_and_naming() {
        let facts = facts("lib/order_loader.rb", LOADER);
        assert_eq!(facts.docs.public_symbols, 4);
        assert_eq!(facts.docs.documented_symbols, 2);
        assert_eq!(facts.naming.total, 5);
        assert_eq!(facts.naming.conventional, 5);
        assert_eq!(facts.imports, ["json", "lib/store"]);
    }

    #[test]
    fn test_rspec() {
        let src = "\
RSpec.describe OrderLoader do\n\
  it 'loads orders' do\n\
    expect(loader.load('x')).to eq([])\n\
  end\n\
\n\
  it 'rejects missing files' do\n\
    expect { loader.load('nope') }.to raise_error(ArgumentError)\n\
  end\n\
end\n";
        let facts = facts("spec/order_loader_spec.rb", src);
        assert!(facts.tests.is_test_file);
        assert_eq!(facts.tests.test_functions, 2);
        assert_eq!(facts.tests.assertions, 2);
    }

    #[test]
    fn test_dangerous_calls() {
        let src = "system(\"rm -rf #{dir}\")\nobj = Marshal.load(data)\neval(code)\nout = %x(ls)\n";
        let facts = facts("x.rb", src);
        assert_eq!(facts.security.get("command_injection"), Some(&2));
        assert_eq!(facts.security.get("unsafe_deserialization"), Some(&1));
        assert_eq!(facts.security.get("eval"), Some(&1));
    }

    #[test]
    fn test_block_comment_only_at_line_start() {
        let src = "=begin\nnotes\n=end\nx = 1\n";
        let facts = facts("x.rb", src);
        assert_eq!(facts.lines.comment, 3);
        assert_eq!(facts.lines.code, 1);
    }
}
