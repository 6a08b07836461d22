//! Console/print primitives and `DRIBBLE`. Every primitive here goes through
//! `interp.terminal`, never directly through `std::io`, so a future
//! embedder can swap in a different [`crate::surfaces::TerminalSurface`].

use crate::builtins::{prim, want_word};
use crate::catalogue::Catalogue;
use crate::datum::Datum;
use crate::error::{self, ErrorCode, LogoError};
use crate::evaluator::{eval_arg, eval_args, StepResult};
use crate::reader::{Reader, StdinLineSource};

pub fn register(cat: &mut Catalogue) {
    prim!(cat, "PRINT", 0, 1, -1, |interp, node| {
            let args = eval_args(interp, node)?;
            let rendered: Vec<String> =
            args.iter().map(|d| d.print(false, interp.print_depth_limit.get(), interp.print_width_limit.get())).collect();
            let mut terminal = interp.terminal.borrow_mut();
            terminal.print_to_console(&rendered.join(" "))?;
            terminal.print_to_console("\n")?;
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "TYPE", 0, 1, -1, |interp, node| {
            let args = eval_args(interp, node)?;
            let rendered: Vec<String> =
            args.iter().map(|d| d.print(false, interp.print_depth_limit.get(), interp.print_width_limit.get())).collect();
            interp.terminal.borrow_mut().print_to_console(&rendered.join(" "))?;
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "SHOW", 0, 1, -1, |interp, node| {
            let args = eval_args(interp, node)?;
            let rendered: Vec<String> =
            args.iter().map(|d| d.show(false, interp.print_depth_limit.get(), interp.print_width_limit.get())).collect();
            let mut terminal = interp.terminal.borrow_mut();
            terminal.print_to_console(&rendered.join(" "))?;
            terminal.print_to_console("\n")?;
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "READLIST", 0, 0, 0, |_interp, _node| {
            let mut source = StdinLineSource::new(false);
            let mut reader = Reader::new(&mut source);
            match reader.read_list_with_prompt("")? {
                Some(list) => Ok(StepResult::Value(Datum::List(list))),
                None => Ok(StepResult::Value(Datum::NoValue)),
            }
        });

    prim!(cat, "READWORD", 0, 0, 0, |_interp, _node| {
            let mut source = StdinLineSource::new(false);
            let mut reader = Reader::new(&mut source);
            match reader.read_raw_line_with_prompt("")? {
                Some(word) => Ok(StepResult::Value(Datum::Word(word))),
                None => Ok(StepResult::Value(Datum::NoValue)),
            }
        });

    prim!(cat, "READCHAR", 0, 0, 0, |interp, _node| {
            match interp.terminal.borrow_mut().read_char()? {
                Some(c) => Ok(StepResult::Value(Datum::word(&c.to_string()))),
                None => Ok(StepResult::Value(Datum::NoValue)),
            }
        });

    prim!(cat, "DRIBBLE", 1, 1, 1, |interp, node| {
            let path = want_word("DRIBBLE", &eval_arg(interp, node, 0)?)?.printable();
            if interp.terminal.borrow().is_dribbling() {
                return LogoError::new_as_result(ErrorCode::AlreadyDribbling, None, "already dribbling".to_string());
            }
            interp.terminal.borrow_mut().set_dribble(Some(&path))?;
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "NODRIBBLE", 0, 0, 0, |interp, _node| {
            interp.terminal.borrow_mut().set_dribble(None)?;
            Ok(StepResult::Value(Datum::NoValue))
        });
}
