pub mod claims;
#[cfg(test)]
pub(crate) mod testing;
pub mod unixtime;
