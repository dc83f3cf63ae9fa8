pub mod cpu_ref;
