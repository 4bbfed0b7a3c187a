//! Providers that know how to read and convert a specific ingress
//! controller's objects.

pub mod gce;
