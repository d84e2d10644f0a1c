use quickcheck::{Arbitrary, Gen};

use crate::{Array, Map, Number, Value};

impl Arbitrary for Number {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            return Number::from(i64::arbitrary(g));
        }
        loop {
            if let Some(n) = Number::from_f64(f64::arbitrary(g)) {
                return n;
            }
        }
    }
}

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        fn gen_val(g: &mut Gen, depth: usize) -> Value {
            let kinds = if depth == 0 { 4 } else { 6 };
            match usize::arbitrary(g) % kinds {
                0 => Value::Null,
                1 => Value::Bool(bool::arbitrary(g)),
                2 => Value::Number(Number::arbitrary(g)),
                3 => Value::String(String::arbitrary(g)),
                4 => {
                    let len = usize::arbitrary(g) % 4;
                    Value::Array((0..len).map(|_| gen_val(g, depth - 1)).collect::<Array>())
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    let mut map = Map::new();
                    for _ in 0..len {
                        map.insert(String::arbitrary(g), gen_val(g, depth - 1));
                    }
                    Value::Object(map)
                }
            }
        }

        let depth = usize::arbitrary(g) % 4;
        gen_val(g, depth)
    }
}
