pub mod atomic_file;
#[cfg(test)]
pub mod test_utils;
pub mod url;
