pub mod aggregate;
pub mod bind;
pub mod calibration;
pub mod capability;
pub mod device;
pub mod manager;
pub mod registry;
pub mod source;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod device_test;
#[cfg(test)]
mod registry_test;
