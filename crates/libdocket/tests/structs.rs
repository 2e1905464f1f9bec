//! Integration tests covering struct and union indexing.
mod utils;
use utils::*;

gen_tests! {
    plain_struct, {
        rt {
            public_fields: {
                input: r#"
                    pub struct Point {
                        pub x: f64,
                        pub y: f64,
                    }
                "#,
                output: r#"
                    pub struct Point
                        pub x: f64
                        pub y: f64
                "#
            }
        }
        rt {
            private_fields_hidden: {
                input: r#"
                    pub struct Account {
                        pub id: u64,
                        balance: i64,
                        pub(crate) owner: String,
                    }
                "#,
                output: r#"
                    pub struct Account
                        pub id: u64
                "#
            }
        }
        rt {
            generic: {
                input: r#"
                    pub struct Wrapper<'a, T: Clone> {
                        pub inner: &'a T,
                    }
                "#,
                output: r#"
                    pub struct Wrapper<'a, T: Clone>
                        pub inner: &'a T
                "#
            }
        }
        rt {
            private_struct_hidden: {
                input: r#"
                    pub struct Visible;
                    struct Hidden;
                "#,
                output: r#"
                    pub struct Visible
                "#
            }
        }
        rt_private {
            private_fields_shown: {
                input: r#"
                    pub struct Account {
                        pub id: u64,
                        balance: i64,
                        pub(crate) owner: String,
                    }
                "#,
                output: r#"
                    pub struct Account
                        pub id: u64
                        balance: i64
                        pub(crate) owner: String
                "#
            }
        }
    }
}

gen_tests! {
    tuple_struct, {
        rt {
            positional_fields: {
                input: r#"
                    pub struct Meters(pub f64, u32);
                "#,
                output: r#"
                    pub struct Meters
                        pub 0: f64
                "#
            }
        }
        rt_private {
            positional_private_fields: {
                input: r#"
                    pub struct Meters(pub f64, u32);
                "#,
                output: r#"
                    pub struct Meters
                        pub 0: f64
                        1: u32
                "#
            }
        }
    }
}

gen_tests! {
    unions, {
        rt {
            union_fields: {
                input: r#"
                    pub union Bits {
                        pub int: u32,
                        pub float: f32,
                    }
                "#,
                output: r#"
                    pub union Bits
                        pub int: u32
                        pub float: f32
                "#
            }
        }
    }
}

#[test]
fn field_docs_and_locations() {
    let index = index_source(
        "pub struct Point {\n    /// Horizontal offset.\n    pub x: f64,\n}\n",
        false,
    );
    let x = index
        .find(&format!("{CRATE_NAME}::Point::x"))
        .expect("field x");
    assert_eq!(x.summary(), Some("Horizontal offset."));
    assert_eq!(x.source.as_ref().map(|source| source.line), Some(3));
}
