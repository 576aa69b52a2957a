//! 테스트 픽스처
//!
//! Person / Student / Teacher, Calculator + Rates, Company, Counter, NamedArgs.
//! 매 호출마다 새 스코프를 만들어서 테스트 간 선언이 섞이지 않게 한다.

#![allow(dead_code)]

use memo_core::{Args, Error, Invocation, MemoizeOptions, Result, Scope, Signature, Visibility};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// CallCounter
// ============================================================================

/// 메서드별 실제 실행 횟수
#[derive(Debug, Default)]
pub struct CallCounter {
    calls: Mutex<HashMap<String, usize>>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 카운트 증가 후 새 값 반환
    pub fn call(&self, name: &str) -> usize {
        let mut calls = self.calls.lock();
        let count = calls.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().get(name).copied().unwrap_or(0)
    }
}

fn counter<'a>(inv: &Invocation<'a>) -> Result<&'a CallCounter> {
    inv.state::<CallCounter>()
}

fn int_arg(inv: &Invocation<'_>, index: usize) -> Result<i64> {
    inv.arg(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::InvalidArgument(format!("argument {} must be an integer", index)))
}

// ============================================================================
// Person / Student / Teacher
// ============================================================================

pub struct People {
    pub person: Arc<Scope>,
    pub student: Arc<Scope>,
    pub teacher: Arc<Scope>,
}

/// Person 은 8개 메서드를 메모이즈, Student 는 `name` 을 식별자 `student` 로
/// 다시 메모이즈, Teacher 는 `seniority` 를 추가
pub fn people() -> Result<People> {
    let person = Scope::class("Person");

    person.define("name", Signature::niladic(), |inv| {
        counter(inv)?.call("name");
        Ok(json!("Josh"))
    });
    person.define("name?", Signature::niladic(), |inv| {
        counter(inv)?.call("name?");
        Ok(json!(true))
    });
    person.memoize("name?")?;

    person.define("update", Signature::positional(1), |_| Ok(json!("Joshua")));
    person.memoize("update")?;

    person.define("age", Signature::niladic(), |inv| {
        counter(inv)?.call("age");
        Ok(Value::Null)
    });
    person.memoize_many(&["name", "age"], MemoizeOptions::new())?;

    person.define("sleep", Signature::new().optional(1), |inv| {
        counter(inv)?.call("sleep");
        Ok(inv.arg_or(0, json!(8)))
    });
    person.memoize("sleep")?;

    person.define("update_attributes", Signature::new().optional(1), |inv| {
        counter(inv)?.call("update_attributes");
        Ok(json!(true))
    });
    person.memoize("update_attributes")?;

    person.define_with(
        "memoize_protected_test",
        Signature::niladic(),
        Visibility::Protected,
        |_| Ok(json!("protected")),
    );
    person.memoize("memoize_protected_test")?;

    person.define_with(
        "is_developer?",
        Signature::niladic(),
        Visibility::Private,
        |inv| {
            counter(inv)?.call("is_developer?");
            Ok(json!("Yes"))
        },
    );
    person.memoize("is_developer?")?;

    let student = Scope::subclass("Student", &person);
    student.define("name", Signature::niladic(), |inv| {
        counter(inv)?.call("student_name");
        let name = inv.call_super(Args::none())?;
        Ok(json!(format!("Student {}", name.as_str().unwrap_or_default())))
    });
    student.memoize_with("name", MemoizeOptions::identifier("student"))?;

    let teacher = Scope::subclass("Teacher", &person);
    teacher.define("seniority", Signature::niladic(), |_| Ok(json!("very_senior")));
    teacher.memoize("seniority")?;

    Ok(People {
        person,
        student,
        teacher,
    })
}

/// Person 이 메모이즈하는 메서드 이름 (정렬됨)
pub const PERSON_MEMOIZED: [&str; 8] = [
    "age",
    "is_developer?",
    "memoize_protected_test",
    "name",
    "name?",
    "sleep",
    "update",
    "update_attributes",
];

// ============================================================================
// Rates / Calculator
// ============================================================================

/// `sales_tax(price)` 를 메모이즈한 모듈
pub fn rates() -> Result<Arc<Scope>> {
    let rates = Scope::module("Rates");
    rates.define("sales_tax", Signature::positional(1), |inv| {
        counter(inv)?.call("sales_tax");
        let price = inv
            .arg(0)
            .and_then(Value::as_f64)
            .ok_or_else(|| Error::InvalidArgument("price must be a number".into()))?;
        Ok(json!(price * 0.1025))
    });
    rates.memoize("sales_tax")?;
    Ok(rates)
}

/// Rates 를 include 한 계산기: fib, add_or_subtract, counter
pub fn calculator() -> Result<Arc<Scope>> {
    let calculator = Scope::class("Calculator");
    calculator.include(&rates()?)?;

    calculator.define("fib", Signature::positional(1), |inv| {
        counter(inv)?.call("fib");
        let n = int_arg(inv, 0)?;
        if n == 0 || n == 1 {
            return Ok(json!(n));
        }
        let a = inv.call("fib", Args::new().arg(n - 1))?;
        let b = inv.call("fib", Args::new().arg(n - 2))?;
        Ok(json!(a.as_i64().unwrap_or(0) + b.as_i64().unwrap_or(0)))
    });
    calculator.memoize("fib")?;

    calculator.define("add_or_subtract", Signature::positional(3), |inv| {
        let i = int_arg(inv, 0)?;
        let j = int_arg(inv, 1)?;
        let add = inv.arg(2).and_then(Value::as_bool).unwrap_or(false);
        Ok(json!(if add { i + j } else { i - j }))
    });
    calculator.memoize("add_or_subtract")?;

    calculator.define("counter", Signature::niladic(), |inv| {
        let count = counter(inv)?.call("counter");
        Ok(json!(count))
    });
    calculator.memoize("counter")?;

    Ok(calculator)
}

// ============================================================================
// Company / Counter
// ============================================================================

/// 메모이즈 선언이 없는 클래스 (객체 단위 메모이즈용)
pub fn company() -> Arc<Scope> {
    let company = Scope::class("Company");
    company.define("name", Signature::niladic(), |inv| {
        counter(inv)?.call("name");
        Ok(json!("37signals"))
    });
    company
}

/// `increment` 가 호출될 때마다 1씩 증가
pub fn counter_class() -> Result<Arc<Scope>> {
    let class = Scope::class("Counter");
    class.define("increment", Signature::niladic(), |inv| {
        let value = counter(inv)?.call("increment");
        Ok(json!(value))
    });
    class.memoize("increment")?;
    Ok(class)
}

// ============================================================================
// NamedArgs
// ============================================================================

/// NamedArgs 인스턴스 상태: `a1` 과 생성된 객체 일련번호
#[derive(Debug)]
pub struct NamedArgsState {
    pub a1: i64,
    created: Mutex<u64>,
}

impl NamedArgsState {
    pub fn new(a1: i64) -> Self {
        Self {
            a1,
            created: Mutex::new(0),
        }
    }

    /// 새 객체를 만든다; `serial` 로 동일 객체 여부를 구분
    fn create_object(&self, a2: Value, a3: Value) -> Value {
        let mut created = self.created.lock();
        *created += 1;
        json!({ "a1": self.a1, "a2": a2, "a3": a3, "serial": *created })
    }
}

fn named_state<'a>(inv: &Invocation<'a>) -> Result<&'a NamedArgsState> {
    inv.state::<NamedArgsState>()
}

pub fn named_args() -> Result<Arc<Scope>> {
    let helper = Scope::class("NamedArgsHelper");

    // calc_with_named_args(a2:, a3: nil)
    helper.define(
        "calc_with_named_args",
        Signature::new().keyword("a2").optional_keyword("a3"),
        |inv| {
            let a2 = inv.keyword("a2").cloned().unwrap_or(Value::Null);
            let a3 = inv.keyword("a3").cloned().unwrap_or(Value::Null);
            Ok(named_state(inv)?.create_object(a2, a3))
        },
    );
    helper.memoize("calc_with_named_args")?;

    // calc_with_positioned_args(a2, a3 = nil)
    helper.define(
        "calc_with_positioned_args",
        Signature::new().required(1).optional(1),
        |inv| {
            let a2 = inv.arg_or(0, Value::Null);
            let a3 = inv.arg_or(1, Value::Null);
            Ok(named_state(inv)?.create_object(a2, a3))
        },
    );
    helper.memoize("calc_with_positioned_args")?;

    // calc_with_mixed_args(a2, a3: nil)
    helper.define(
        "calc_with_mixed_args",
        Signature::positional(1).optional_keyword("a3"),
        |inv| {
            let a2 = inv.arg_or(0, Value::Null);
            let a3 = inv.keyword("a3").cloned().unwrap_or(Value::Null);
            Ok(named_state(inv)?.create_object(a2, a3))
        },
    );
    helper.memoize("calc_with_mixed_args")?;

    Ok(helper)
}
