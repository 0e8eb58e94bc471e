mod tests_position;
mod tests_scenarios;
