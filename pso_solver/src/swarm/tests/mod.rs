mod archive;
mod descriptors;
