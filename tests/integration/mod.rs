mod helpers;
mod test_build;
mod test_release;
