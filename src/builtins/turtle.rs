//! Turtle-graphics primitives. This CLI has no real canvas attached
//! (`Interpreter::graphics_enabled` is always `false`), so every primitive
//! here resolves through [`crate::builtins::no_graphics_error`] rather than
//! drawing — the [`crate::surfaces::NullTurtle`] backend exists so an
//! embedder that *does* attach a canvas only needs to flip that flag and
//! swap `interp.turtle`, not touch this registration.

use crate::builtins::{bool_datum, no_graphics_error, prim, want_number};
use crate::catalogue::Catalogue;
use crate::datum::Datum;
use crate::evaluator::{eval_arg, StepResult};

pub fn register(cat: &mut Catalogue) {
    prim!(cat, ["FORWARD", "FD"], 1, 1, 1, |interp, node| {
            let distance = want_number("FORWARD", &eval_arg(interp, node, 0)?)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().forward(distance);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["BACK", "BK"], 1, 1, 1, |interp, node| {
            let distance = want_number("BACK", &eval_arg(interp, node, 0)?)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().forward(-distance);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["RIGHT", "RT"], 1, 1, 1, |interp, node| {
            let angle = want_number("RIGHT", &eval_arg(interp, node, 0)?)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().rotate(angle);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["LEFT", "LT"], 1, 1, 1, |interp, node| {
            let angle = want_number("LEFT", &eval_arg(interp, node, 0)?)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().rotate(-angle);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "SETXY", 2, 2, 2, |interp, node| {
            let x = want_number("SETXY", &eval_arg(interp, node, 0)?)?;
            let y = want_number("SETXY", &eval_arg(interp, node, 1)?)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().set_xy(x, y);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["SETHEADING", "SETH"], 1, 1, 1, |interp, node| {
            let heading = want_number("SETHEADING", &eval_arg(interp, node, 0)?)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().set_heading(heading);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "HOME", 0, 0, 0, |interp, _node| {
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().home();
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["PENUP", "PU"], 0, 0, 0, |interp, _node| {
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().pen_up();
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["PENDOWN", "PD"], 0, 0, 0, |interp, _node| {
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().pen_down();
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "SETPENCOLOR", 1, 1, 1, |interp, node| {
            let rgb_list = crate::builtins::want_list("SETPENCOLOR", &eval_arg(interp, node, 0)?)?;
            let components = rgb_list.to_vec();
            if components.len() != 3 {
                return crate::error::doesnt_like(None, "SETPENCOLOR", &Datum::List(rgb_list));
            }
            let mut rgb = [0.0; 3];
            for (i, c) in components.iter().enumerate() {
                rgb[i] = want_number("SETPENCOLOR", c)?;
            }
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().set_pen_color((rgb[0], rgb[1], rgb[2]));
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "SETPENSIZE", 1, 1, 1, |interp, node| {
            let size = want_number("SETPENSIZE", &eval_arg(interp, node, 0)?)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            if !interp.turtle.borrow().is_pen_size_valid(size) {
                return crate::error::doesnt_like(None, "SETPENSIZE", &Datum::number(size));
            }
            interp.turtle.borrow_mut().set_pen_size(size);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["CLEARSCREEN", "CS"], 0, 0, 0, |interp, _node| {
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().clear_canvas();
            interp.turtle.borrow_mut().home();
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "LABEL", 1, 1, 1, |interp, node| {
            let text = eval_arg(interp, node, 0)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().draw_label(&text.print(false, -1, -1));
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "ARC", 2, 2, 2, |interp, node| {
            let angle = want_number("ARC", &eval_arg(interp, node, 0)?)?;
            let radius = want_number("ARC", &eval_arg(interp, node, 1)?)?;
            if !interp.graphics_enabled {
                return no_graphics_error();
            }
            interp.turtle.borrow_mut().draw_arc(angle, radius);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["FILLED", "FILL"], 1, 1, 1, |interp, node| {
            let _ = eval_arg(interp, node, 0)?;
            no_graphics_error()
        });

    prim!(cat, "POS", 0, 0, 0, |interp, _node| {
            let (x, y) = interp.turtle.borrow().position();
            Ok(StepResult::Value(Datum::list(vec![Datum::number(x), Datum::number(y)])))
        });

    prim!(cat, "HEADING", 0, 0, 0, |interp, _node| {
            Ok(StepResult::Value(Datum::number(interp.turtle.borrow().heading())))
        });

    prim!(cat, ["PENDOWNP", "PENDOWN?"], 0, 0, 0, |interp, _node| {
            Ok(StepResult::Value(bool_datum(interp.turtle.borrow().is_pen_down())))
        });

    prim!(cat, "PENCOLOR", 0, 0, 0, |interp, _node| {
            let (r, g, b) = interp.turtle.borrow().pen_color();
            Ok(StepResult::Value(Datum::list(vec![Datum::number(r), Datum::number(g), Datum::number(b)])))
        });

    prim!(cat, "PENSIZE", 0, 0, 0, |interp, _node| {
            Ok(StepResult::Value(Datum::number(interp.turtle.borrow().pen_size())))
        });

    prim!(cat, "SHOWNP", 0, 0, 0, |_interp, _node| {
            Ok(StepResult::Value(bool_datum(true)))
        });
}
