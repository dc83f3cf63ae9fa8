mod kernel_set;
mod lanes;
