mod tests_concurrency;
