//! Integration tests covering free functions, constants, statics and type aliases.
mod utils;
use utils::*;

gen_tests! {
    functions, {
        rt {
            plain: {
                input: r#"
                    pub fn add(a: u32, b: u32) -> u32 {
                        a + b
                    }
                "#,
                output: r#"
                    pub fn add(a: u32, b: u32) -> u32
                "#
            }
        }
        rt {
            generic_with_references: {
                input: r#"
                    pub fn largest<T: PartialOrd>(items: &[T]) -> Option<&T> {
                        items.iter().next()
                    }
                "#,
                output: r#"
                    pub fn largest<T: PartialOrd>(items: &[T]) -> Option<&T>
                "#
            }
        }
        rt {
            qualifiers: {
                input: r#"
                    pub async fn fetch() {}
                    pub const fn zero() -> u32 {
                        0
                    }
                    pub unsafe fn read(ptr: *const u8) -> u8 {
                        *ptr
                    }
                "#,
                output: r#"
                    pub async fn fetch()
                    pub const fn zero() -> u32
                    pub unsafe fn read(ptr: *const u8) -> u8
                "#
            }
        }
        rt {
            private_function_hidden: {
                input: r#"
                    pub fn visible() {}
                    fn helper() {}
                    pub(crate) fn internal() {}
                "#,
                output: r#"
                    pub fn visible()
                "#
            }
        }
        rt_private {
            private_functions_shown: {
                input: r#"
                    pub fn visible() {}
                    fn helper() {}
                    pub(crate) fn internal() {}
                "#,
                output: r#"
                    pub fn visible()
                    fn helper()
                    pub(crate) fn internal()
                "#
            }
        }
    }
}

gen_tests! {
    values, {
        rt {
            constants_and_statics: {
                input: r#"
                    pub const MAX: usize = 3;
                    pub static NAME: &str = "docket";
                    const HIDDEN: u8 = 0;
                    const _: () = ();
                "#,
                output: r#"
                    pub const MAX: usize = 3
                    pub static NAME: &str = "docket"
                "#
            }
        }
        rt {
            type_alias: {
                input: r#"
                    pub type Pair = (u32, u32);
                "#,
                output: r#"
                    pub type Pair = (u32, u32)
                "#
            }
        }
    }
}
