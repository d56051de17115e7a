use codemerge_engine::{CodeVersion, IdMap, MergeScenario, MergedJsx, rename_and_merge, same_code};
use pretty_assertions::assert_eq;

fn ids(pairs: &[(&str, &str)]) -> IdMap {
    pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

fn merge_with(base: &str, edited: &str, new: &str, old_ids: &IdMap, new_ids: &IdMap) -> MergedJsx {
    let base = CodeVersion::from_expression(base, old_ids.clone()).unwrap();
    let edited = CodeVersion::from_expression(edited, old_ids.clone()).unwrap();
    let new = CodeVersion::from_expression(new, new_ids.clone()).unwrap();
    rename_and_merge(MergeScenario::new(&base, &edited, &new)).unwrap()
}

fn assert_merged(merged: &MergedJsx, expected: &str) {
    let actual = merged.syntax.to_string();
    if !same_code(&actual, expected) {
        // Compare the texts so the failure shows a readable diff.
        assert_eq!(actual, expected.to_string());
    }
}

fn check(base: &str, edited: &str, new: &str, old_ids: &IdMap, new_ids: &IdMap, expected: &str) {
    assert_merged(&merge_with(base, edited, new, old_ids, new_ids), expected);
}

fn check_same_ids(base: &str, edited: &str, new: &str, pairs: &[(&str, &str)], expected: &str) {
    let map = ids(pairs);
    check(base, edited, new, &map, &map, expected);
}

#[test]
fn no_change() {
    let src = "<div className={rh.clsRoot()}>Hello World</div>";
    check_same_ids(src, src, src, &[("Root", "Root")], src);
}

#[test]
fn valueless_null_and_member_tag() {
    check_same_ids(
        "<div className={rh.clsRoot()}>Hello World</div>",
        "<MyTags.div className={rh.clsRoot()} disabled nulled={null} empty={{}}>Hello World</MyTags.div>",
        "<MyTags.div className={rh.clsRoot()}>Hello World</MyTags.div>",
        &[("Root", "Root")],
        "<MyTags.div className={rh.clsRoot()} disabled nulled={null} empty={{}}>Hello World</MyTags.div>",
    );
}

#[test]
fn tag_renamed_on_both_sides() {
    check_same_ids(
        "<div className={rh.clsRoot()}>Hello World</div>",
        "<MyTags.div className={rh.clsRoot()}>Hello World</MyTags.div>",
        "<Button className={rh.clsRoot()}>Hello World</Button>",
        &[("Root", "Root")],
        "<MyTags.div___Button className={rh.clsRoot()}>Hello World</MyTags.div___Button>",
    );
}

#[test]
fn tag_renamed_in_new_only() {
    check_same_ids(
        "<div className={rh.clsRoot()}>\n</div>",
        "<div className={rh.clsRoot()}>\n</div>",
        "<button className={rh.clsRoot()}>\n</button>",
        &[("Root", "Root")],
        "<button className={rh.clsRoot()}></button>",
    );
}

#[test]
fn props_upgrade_and_downgrade() {
    check_same_ids(
        r#"<div className={rh.clsRoot()}>
        <a className={rh.clsMyLink()} {...rh.propsMyLink()}>Google</a>
        <button className={rh.clsMyButton()} {...rh.propsMyButton()}/>
       </div>"#,
        r#"<div className={rh.clsRoot()} width={1}>
        <a className={rh.clsMyLink()} {...rh.propsMyLink()}>Google</a>
        <button className={rh.clsMyButton()} {...rh.propsMyButton(modifier)}/>
       </div>"#,
        r#"<div className={rh.clsRoot()} {...rh.propsRoot()}>
        <a className={rh.clsMyLink()}>Google</a>
        <button className={rh.clsMyButton()}/>
       </div>"#,
        &[("Root", "Root"), ("MyLink", "MyLink"), ("MyButton", "MyButton")],
        r#"<div className={rh.clsRoot()} {...rh.propsRoot()} width={1}>
         <a className={rh.clsMyLink()}>Google</a>
        <button className={rh.clsMyButton()} {...rh.propsMyButton(modifier)} />
       </div>"#,
    );
}

#[test]
fn class_name_renamed() {
    let old = ids(&[("Root", "Root")]);
    let new = ids(&[("NewRoot", "Root")]);
    check(
        "<div className={rh.clsRoot()} />",
        "<div className={rh.clsRoot()} />",
        "<div className={rh.clsNewRoot()}/>",
        &old,
        &new,
        "<div className={rh.clsNewRoot()} />",
    );
    check(
        "<div className={rh.clsRoot()} />",
        "<div className={rh.clsRoot() + ' myClass'} />",
        "<div className={rh.clsNewRoot()}/>",
        &old,
        &new,
        "<div className={rh.clsNewRoot() + ' myClass'} />",
    );
}

#[test]
fn edited_class_name_survives_its_removal_from_new() {
    check(
        "<div className={rh.clsRoot()} />",
        "<div className={rh.clsRoot() + ' myClass'} />",
        "<div {...rh.propsNewRoot()}/>",
        &ids(&[("Root", "Root")]),
        &ids(&[("NewRoot", "Root")]),
        "<div className={rh.clsNewRoot() + ' myClass'} {...rh.propsNewRoot()}/>",
    );
}

#[test]
fn show_guard_added_and_removed() {
    check_same_ids(
        r#"<div className={rh.clsRoot()}>
        {rh.showMyLink() && <a {...rh.propsMyLink()}>Google</a>}
        <button {...rh.propsMyButton()}/>
      </div>"#,
        r#"<div className={rh.clsRoot()}>
        {rh.showMyLink() && <a {...rh.propsMyLink()}>Google</a>}
        <button {...rh.propsMyButton(modifier)}/>
      </div>"#,
        r#"<div className={rh.clsRoot()}>
        <a {...rh.propsMyLink()}>Google</a>
        {rh.showMyButton() && <button {...rh.propsMyButton()}/>}
      </div>"#,
        &[("Root", "Root"), ("MyLink", "MyLink"), ("MyButton", "MyButton")],
        r#"<div className={rh.clsRoot()}>
         {true && <a {...rh.propsMyLink()}>Google</a>}
         {rh.showMyButton() && <button {...rh.propsMyButton(modifier)}/>}
       </div>"#,
    );
}

#[test]
fn node_deleted_by_developer() {
    check_same_ids(
        "<div className={rh.clsRoot()}><a {...rh.propsMyLink()}>Google</a><button className={rh.clsMyButton()} {...rh.propsMyButton()}/></div>",
        "<div className={rh.clsRoot()} width={1}><button className={rh.clsMyButton()} {...rh.propsMyButton(modifier)}/></div>",
        "<div className={rh.clsRoot()} {...rh.propsRoot()}><a className={rh.clsMyLink()}>Google</a><button className={rh.clsMyButton()}/></div>",
        &[("Root", "Root"), ("MyLink", "MyLink"), ("MyButton", "MyButton")],
        r#"<div className={rh.clsRoot()} {...rh.propsRoot()} width={1}>
        <button className={rh.clsMyButton()} {...rh.propsMyButton(modifier)} />
      </div>"#,
    );
}

#[test]
fn nodes_reordered() {
    check_same_ids(
        r#"<div className={rh.clsRoot()}>
         <a className={rh.clsMyLink()} {...rh.propsMyLink()}>Google</a>
         <button className={rh.clsMyButton()} {...rh.propsMyButton()}/>
      </div>"#,
        r#"<div className={rh.clsRoot()} width={1}>
        <button className={rh.clsMyButton()} {...rh.propsMyButton(modifier)}/>
        <a className={rh.clsMyLink()} {...rh.propsMyLink()}>Google</a>
      </div>"#,
        "<div className={rh.clsRoot()} {...rh.propsRoot()}><button className={rh.clsMyButton()}/><a className={rh.clsMyLink()}>Google</a></div>",
        &[("Root", "Root"), ("MyLink", "MyLink"), ("MyButton", "MyButton")],
        r#"<div className={rh.clsRoot()} {...rh.propsRoot()} width={1}>
      <button className={rh.clsMyButton()} {...rh.propsMyButton(modifier)} />
      <a className={rh.clsMyLink()}>Google</a>
      </div>"#,
    );
}

#[test]
fn nodes_wrapped_by_developer() {
    check_same_ids(
        r#"<div className={rh.clsRoot()}>
         <button {...rh.propsMyButton()}/>
         <a className={rh.clsMyLink()}>Google</a>
      </div>"#,
        r#"<div className={rh.clsRoot()} width={1}>
        {myGuard() && <button {...rh.propsMyButton()} tabIndex={1}/>}
        <Wrapper>
          <a className={rh.clsMyLink()} tabIndex={2}>Google</a>
        </Wrapper>
      </div>"#,
        r#"<div className={rh.clsRoot()} {...rh.propsRoot()}>
        <button className={rh.clsMyButton()}/>
        <a className={rh.clsMyLink()}>Google</a>
      </div>"#,
        &[("Root", "Root"), ("MyLink", "MyLink"), ("MyButton", "MyButton")],
        r#"<div className={rh.clsRoot()} {...rh.propsRoot()} width={1}>
        {myGuard() && <button className={rh.clsMyButton()} tabIndex={1}/>}
        <Wrapper>
          <a className={rh.clsMyLink()} tabIndex={2}>Google</a>
        </Wrapper>
      </div>"#,
    );
}

#[test]
fn node_moved_to_another_parent() {
    check_same_ids(
        r#"<div className={rh.clsRoot()}>
         <div className={rh.clsC1()}>
           <button {...rh.propsMyButton()}/>
         </div>
         <div className={rh.clsC2()}>
         </div>
      </div>"#,
        r#"<div className={rh.clsRoot()}>
         <div className={rh.clsC1()}>
           <button {...rh.propsMyButton()} tabIndex={1}/>
         </div>
         <div className={rh.clsC2()}>
         </div>
      </div>"#,
        r#"<div className={rh.clsRoot()}>
         <div className={rh.clsC1()}>
           {args.text || "default"}
         </div>
         <div className={rh.clsC2()}>
           <button {...rh.propsMyButton()}/>
         </div>
      </div>"#,
        &[("Root", "Root"), ("C1", "C1"), ("C2", "C2"), ("MyButton", "MyButton")],
        r#"<div className={rh.clsRoot()}>
      <div className={rh.clsC1()}>
        {args.text || "default"}
      </div>
      <div className={rh.clsC2()}>
      <button {...rh.propsMyButton()} tabIndex={1}/>
      </div>
   </div>"#,
    );
}

#[test]
fn developer_children_keep_their_place() {
    check_same_ids(
        r#"<div className={rh.clsRoot()}>
        Hello World
        <div className={rh.clsImg()}></div>
      </div>"#,
        r#"<div className={rh.clsRoot()}>
        {"Added text node"}
        Hello World
        <div>Opaque node 1</div>
        <div className={rh.clsImg()} onClick={xxx}></div>
        {"Second text"}
        {showThis() && <div>Opaque node 2</div>}
      </div>"#,
        r#"<div className={rh.clsRoot()}>
        Hello World Edited
        <div className={rh.clsImg()}></div>
      </div>"#,
        &[("Root", "Root"), ("Img", "Img")],
        r#"<div className={rh.clsRoot()}>
        {"Added text node"}
        Hello World Edited
        <div>Opaque node 1</div>
        <div className={rh.clsImg()} onClick={xxx}></div>
        {"Second text"}
        {showThis() && <div>Opaque node 2</div>}
     </div>"#,
    );
}

#[test]
fn text_children_edited() {
    let pairs = [("Root", "Root"), ("Img", "Img")];
    check_same_ids(
        r#"<div className={rh.clsRoot()}>
        Hello World
        <div className={rh.clsImg()}></div>
      </div>"#,
        "<div className={rh.clsRoot()}>\n  Hello World Edited\n</div>",
        "<div className={rh.clsRoot()}>\n  Hello World\n</div>",
        &pairs,
        "<div className={rh.clsRoot()}>Hello World Edited</div>",
    );
    check_same_ids(
        r#"<div className={rh.clsRoot()}>
        {"Hello"} {"World"} {"My"} {"Friends"}
        <div className={rh.clsImg()}></div>
      </div>"#,
        r#"<div className={rh.clsRoot()}>
      {"Hello1"} {"World"} {"My2"} {"Friends"}
      </div>"#,
        r#"<div className={rh.clsRoot()}>
      {"Hello"} {"World"} {"My3"} {"Friends"}
      </div>"#,
        &pairs,
        r#"<div className={rh.clsRoot()}>
      {"Hello1"}
      {"World"}
      {"My3"}
      {"My2"}
      {"Friends"}
     </div>"#,
    );
}

#[test]
fn conflicting_attribute_keeps_both_values() {
    check_same_ids(
        "<div className={rh.clsRoot()}>\n</div>",
        "<div className={rh.clsRoot()} tabindex={123}>\nHello World\n</div>",
        "<div className={rh.clsRoot()} tabindex={234}>\n</div>",
        &[("Root", "Root")],
        "<div className={rh.clsRoot()} tabindex={<>{234}{123}</>}>Hello World</div>",
    );
}

#[test]
fn event_handlers_follow_renames() {
    check(
        r#"<div className={ rh.clsRoot() }
        onMouseEnter={ rh.onMouseEnterRoot }
        onMouseLeave={rh.onMouseLeaveRoot}
        onMouseDown={rh.onMouseDownRoot}>
      </div>"#,
        r#"<div className={rh.clsRoot()
      }
        onMouseEnter={
          rh.onMouseEnterRoot}
        onMouseLeave={() => {
          rh.onMouseLeaveRoot();
          myEventHandler();
        }}
        onClick={handleClick}>
      Hello World
      </div>"#,
        r#"<div className={ rh.clsNewRoot()}
       onMouseEnter={ rh.onMouseEnterNewRoot}
       onMouseLeave={rh.onMouseLeaveNewRoot}
       onMouseDown={rh.onMouseDownNewRoot}>
      </div>"#,
        &ids(&[("Root", "Root")]),
        &ids(&[("NewRoot", "Root")]),
        r#"<div
        className={rh.clsNewRoot()}
        onMouseEnter={rh.onMouseEnterNewRoot}
        onMouseLeave={() => {
          rh.onMouseLeaveNewRoot();
          myEventHandler();
        }}
        onClick={handleClick}>
        Hello World
   </div>"#,
    );
}

#[test]
fn children_added_in_new() {
    check(
        "<div className={rh.clsRoot()} />",
        "<div className={rh.clsRoot()} />",
        "<div className={rh.clsRoot()}>\n  <div className={rh.clsBox()}/>\n</div>",
        &ids(&[("Root", "Root")]),
        &ids(&[("Root", "Root"), ("Box", "Box")]),
        "<div className={rh.clsRoot()}><div className={rh.clsBox()}/></div>",
    );
}

#[test]
fn attribute_markup_changed_in_new() {
    check_same_ids(
        "<div className={rh.clsRoot()} icon={<img className={rh.clsImg()}></img>} />",
        "<div className={rh.clsRoot()} icon={<img className={rh.clsImg()}></img>} />",
        "<div className={rh.clsRoot()} icon={<img className={rh.clsImg()} {...rh.propsImg()}></img>} />",
        &[("Root", "Root"), ("Img", "Img")],
        "<div className={rh.clsRoot()} icon={<img className={rh.clsImg()} {...rh.propsImg()}></img>} />",
    );
}

#[test]
fn text_and_child_str_calls() {
    let pairs = [("Root", "Root"), ("Btn", "Btn")];
    let plain = "<div className={rh.clsRoot()}>\n  <button className={rh.clsBtn()}>Click Me</button>\n</div>";
    let reflowed = "<div className={rh.clsRoot()}>\n  <button className={rh.clsBtn()}>\n    Click Me\n  </button>\n</div>";
    let call = "<div className={rh.clsRoot()}>\n  <button className={rh.clsBtn()}>{rh.childStrBtn()}</button>\n</div>";
    check_same_ids(plain, reflowed, plain, &pairs, plain);
    check_same_ids(plain, reflowed, call, &pairs, call);
    check_same_ids(call, call, plain, &pairs, plain);
}

#[test]
fn slot_renamed_keeps_edited_default_content() {
    let old = ids(&[("Root", "Root"), ("$slotText", "1234")]);
    let new = ids(&[("Root", "Root"), ("$slotText2", "1234")]);
    check(
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot className={rh.cls$slotText()} value={args.text} defaultContent={"Abc"} />
       </div>"#,
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot className={rh.cls$slotText()} value={args.text} defaultContent={<a>"Abc"</a>} />
       </div>"#,
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot className={rh.cls$slotText2()} value={args.text2} defaultContent={"Abc"} />
       </div>"#,
        &old,
        &new,
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot className={rh.cls$slotText2()} value={args.text2} defaultContent={<a>"Abc"</a>} />
       </div>"#,
    );
    check(
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot value={args.text} className={rh.cls$slotText()} defaultContent={"Hello"} />
       </div>"#,
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot value={args.text} className={rh.cls$slotText()} defaultContent={"Hello World"} />
       </div>"#,
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot value={args.text2} className={rh.cls$slotText2()} defaultContent={"Hello"} />
       </div>"#,
        &old,
        &new,
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot value={args.text2} className={rh.cls$slotText2()} defaultContent={"Hello World"} />
       </div>"#,
    );
}

#[test]
fn slot_default_content_grows_to_two_nodes() {
    check(
        r#"<div className={rh.clsRoot()}>
         <PlasmicSlot
           className={rh.cls$slotIconSlot()}
           value={args.iconSlot}
           defaultContent={<img className={rh.clsImg0()}></img>}/>
       </div>"#,
        r#"<div className={rh.clsRoot()}>
         <PlasmicSlot
           className={rh.cls$slotIconSlot()}
           value={args.iconSlot}
           defaultContent={<img className={rh.clsImg0()} tabIndex={1}></img>}/>
       </div>"#,
        r#"<div className={rh.clsRoot()}>
         <PlasmicSlot
           className={rh.cls$slotIconSlot2()}
           value={args.iconSlot}
           defaultContent={
             <>
               <img className={rh.clsImg1()}></img>
               <img className={rh.clsImg0()}></img>
             </>}/>
       </div>"#,
        &ids(&[("Root", "Root"), ("Img0", "1234"), ("$slotIconSlot", "2345")]),
        &ids(&[
            ("Root", "Root"),
            ("Img0", "1234"),
            ("Img1", "4567"),
            ("$slotIconSlot2", "2345"),
        ]),
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot
          className={rh.cls$slotIconSlot2()}
          value={args.iconSlot}
          defaultContent={
            <>
              <img className={rh.clsImg1()}></img>
              <img className={rh.clsImg0()} tabIndex={1}></img>
            </>}/>
      </div>"#,
    );
}

#[test]
fn slot_args_renamed_everywhere() {
    let old = ids(&[("Root", "Root"), ("$slotIconSlot", "2345")]);
    let new = ids(&[("Root", "Root"), ("$slotIconSlot2", "2345")]);
    let base = r#"<div className={rh.clsRoot()}>
         <PlasmicSlot
           className={rh.cls$slotIconSlot()}
           value={args.iconSlot}
           defaultContent={<></>}/>
       </div>"#;
    let new_src = r#"<div className={rh.clsRoot()}>
         <PlasmicSlot
           className={rh.cls$slotIconSlot2()}
           value={args.iconSlot2}
           defaultContent={
              <></>
           }/>
       </div>"#;
    check(
        base,
        r#"<div className={rh.clsRoot()}>
         <PlasmicSlot
           className={rh.cls$slotIconSlot()}
           value={args.iconSlot || "abc"}
           defaultContent={<></>}/>
          {showArgsAgain() && args.iconSlot}
       </div>"#,
        new_src,
        &old,
        &new,
        r#"<div className={rh.clsRoot()}>
        <PlasmicSlot
          className={rh.cls$slotIconSlot2()}
          value={args.iconSlot2 || "abc"}
          defaultContent={<></>}/>
        {showArgsAgain() && args.iconSlot2}
      </div>"#,
    );
}

#[test]
fn renamed_node_inside_developer_attribute() {
    let old = ids(&[("Root", "Root"), ("Btn", "2345"), ("Img", "3456")]);
    let new = ids(&[("Root", "Root"), ("Btn", "2345"), ("Img2", "3456")]);
    let base = r#"<div className={rh.clsRoot()}>
        <Button className={rh.clsBtn()}/>
        <img className={rh.clsImg()}></img>
       </div>"#;
    let new_src = r#"<div className={rh.clsRoot()}>
      <Button className={rh.clsBtn()}/>
      <img className={rh.clsImg2()}></img>
     </div>"#;
    check(
        base,
        r#"<div className={rh.clsRoot()}>
      <Button className={rh.clsBtn()} icon={<img className={rh.clsImg()} tabIndex={1}></img>}/>
     </div>"#,
        new_src,
        &old,
        &new,
        r#"<div className={rh.clsRoot()}>
        <Button className={rh.clsBtn()} icon={<img className={rh.clsImg2()} tabIndex={1}></img>}/>
       </div>"#,
    );
    check(
        base,
        r#"<div className={rh.clsRoot()}>
      <Button className={rh.clsBtn()} {...{icon: <img className={rh.clsImg()} tabIndex={1}></img>}}/>
     </div>"#,
        new_src,
        &old,
        &new,
        r#"<div className={rh.clsRoot()}>
        <Button className={rh.clsBtn()}
          {...{
            icon: <img className={rh.clsImg2()} tabIndex={1}></img>
          }}/>
       </div>"#,
    );
}

#[test]
fn secondary_nodes_merged_when_primary_remains() {
    let merged = merge_with(
        r#"<div className={rh.clsRoot()}>
        <Button className={rh.clsBtn()} {...rh.propsBtn()}/>
        {rh.showImg() && <img className={rh.clsImg()}></img>}
        {rh.showLink() && <a className={rh.clsLink()}></a>}
       </div>"#,
        r#"<div className={rh.clsRoot()}>
      {(() => {
        return (<>
          <Button className={rh.clsBtn()} {...rh.propsBtn()}/>
          {rh.showImg() && <img className={rh.clsImg() + " myClass"} tabIndex={1}></img>}
          {rh.showLink() && <a className={rh.clsLink()}></a>}
          </>);
      })()}
     </div>"#,
        r#"<div className={rh.clsRoot()}>
      <Button className={rh.clsBtn()} {...rh.propsBtn()}/>
      {rh.showImg2() && <img className={rh.clsImg2()} {...rh.propsImg2()}></img>}
      <a className={rh.clsLink2()}></a>
     </div>"#,
        &ids(&[("Root", "Root"), ("Btn", "2345"), ("Img", "3456"), ("Link", "4567")]),
        &ids(&[("Root", "Root"), ("Btn", "2345"), ("Img2", "3456"), ("Link2", "4567")]),
    );
    assert_merged(
        &merged,
        r#"<div className={rh.clsRoot()}>
        {(() => {
          return (<>
            <Button className={rh.clsBtn()} {...rh.propsBtn()}/>
            {rh.showImg2() && <img className={rh.clsImg2() + " myClass"} {...rh.propsImg2()} tabIndex={1}></img>}
            {true && <a className={rh.clsLink2()}></a>}
            </>);
        })()}
       </div>"#,
    );
    let names: Vec<&str> = merged
        .warnings
        .secondary_nodes()
        .iter()
        .map(|s| s.name_in_id.as_str())
        .collect();
    assert_eq!(names, vec!["Img2", "Link2"]);
}

#[test]
fn secondary_nodes_dropped_with_their_primary() {
    let merged = merge_with(
        r#"<div className={rh.clsRoot()}>
        <Button className={rh.clsBtn()} {...rh.propsBtn()}/>
        <img className={rh.clsImg()}></img>
       </div>"#,
        r#"<div className={rh.clsRoot()}>
      {(() => {
        return (<>
          <Button className={rh.clsBtn()} {...rh.propsBtn()}/>
          <img className={rh.clsImg() + " myClass"} tabIndex={1}></img>
          </>);
      })()}
     </div>"#,
        r#"<div className={rh.clsRoot()}>
        {rh.showImg2() && <img className={rh.clsImg2()} {...rh.propsImg2()}></img>}
       </div>"#,
        &ids(&[("Root", "Root"), ("Btn", "2345"), ("Img", "3456")]),
        &ids(&[("Root", "Root"), ("Btn", "2345"), ("Img2", "3456")]),
    );
    assert_merged(&merged, "<div className={rh.clsRoot()}></div>");
    assert!(merged.warnings.secondary_nodes().is_empty());
    assert_eq!(merged.warnings.raw_warnings().len(), 1);
    let warning = &merged.warnings.raw_warnings()[0];
    assert!(warning.contains("Btn"), "{}", warning);
    assert!(warning.contains("Img2"), "{}", warning);
}

#[test]
fn grouping_parens_changed_in_new() {
    check_same_ids(
        "<div className={rh.clsRoot()} width={(a + b) * c} />",
        "<div className={rh.clsRoot()} width={(a + b) * c} />",
        "<div className={rh.clsRoot()} width={a + b * c} />",
        &[("Root", "Root")],
        "<div className={rh.clsRoot()} width={a + b * c} />",
    );
}
