//! Shared fixture: the tree exercised by the session and completion tests.

use std::cell::RefCell;
use std::rc::Rc;

use promptr::{Argument, CommandTree, NodeSpec, Prompt, PromptConfig};

pub type Log = Rc<RefCell<Vec<String>>>;

/// ```text
/// cmd1
/// group1
/// state1 <arg1>          prompt "s1", logs on exit
///   [no] cmd2            passes called_name and context arg1
///   remember <value>     stores "secret" in the context
/// state2
///   group2 <arg2>        stores arg2 in the context
///   state3
/// ```
pub fn fixture() -> (Prompt, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut tree = CommandTree::new();
    let root = tree.root();

    let sink = Rc::clone(&log);
    tree.add(
        root,
        NodeSpec::command("cmd1").callback(move |_| {
            sink.borrow_mut().push("cmd1".into());
            Ok(())
        }),
    )
    .unwrap();

    tree.add(root, NodeSpec::group("group1")).unwrap();

    let sink = Rc::clone(&log);
    let state1 = tree
        .add(
            root,
            NodeSpec::state("state1")
                .prompt("s1")
                .argument(Argument::new("arg1").completions_with(|| {
                    vec!["test1".to_string(), "test2".to_string()]
                }))
                .callback(move |call| {
                    sink.borrow_mut()
                        .push(format!("state1 {}", call.get("arg1").unwrap_or_default()));
                    Ok(())
                }),
        )
        .unwrap();

    let sink = Rc::clone(&log);
    tree.set_on_exit(state1, move |_| {
        sink.borrow_mut().push("state1 exit".into());
        Ok(())
    })
    .unwrap();

    let sink = Rc::clone(&log);
    tree.add(
        state1,
        NodeSpec::command("cmd2")
            .optional_prefix("no")
            .pass_called_name()
            .pass_context("arg1")
            .callback(move |call| {
                sink.borrow_mut().push(format!(
                    "{} arg1={}",
                    call.called_name().unwrap_or_default(),
                    call.get("arg1").unwrap_or("-")
                ));
                Ok(())
            }),
    )
    .unwrap();

    tree.add(
        state1,
        NodeSpec::command("remember")
            .argument(Argument::new("value"))
            .callback(|call| {
                let value = call.get("value").unwrap_or_default().to_string();
                call.set_context("secret", value);
                Ok(())
            }),
    )
    .unwrap();

    let state2 = tree.add(root, NodeSpec::state("state2")).unwrap();

    let sink = Rc::clone(&log);
    tree.add(
        state2,
        NodeSpec::group("group2")
            .argument(Argument::new("arg2"))
            .callback(move |call| {
                sink.borrow_mut()
                    .push(format!("group2 {}", call.get("arg2").unwrap_or_default()));
                Ok(())
            }),
    )
    .unwrap();

    tree.add(state2, NodeSpec::state("state3")).unwrap();

    let config = PromptConfig::default().prompt_fmt("{state}#");
    (Prompt::new(tree, config), log)
}
