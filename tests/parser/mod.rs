mod tests_recovery;
mod tests_rule_parser;
mod tests_tokenizer;
